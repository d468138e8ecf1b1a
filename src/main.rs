mod api;
mod backup;
mod blockchain;
mod config;
mod consensus;
mod error;
mod service;
mod transaction;

use std::io;

use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use log::info;

use api::AppState;
use config::Settings;
use consensus::PeerClient;

#[actix_web::main]
async fn main() -> io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let settings = Settings::from_env();
    let peer_client = PeerClient::new(settings.peer_timeout).map_err(io::Error::other)?;
    let state = web::Data::new(AppState::new(&settings, peer_client));

    info!(
        "⛓️ Starting ledger node {} at http://{}:{} (difficulty {}, {} peers)",
        state.node_id,
        settings.host,
        settings.port,
        settings.difficulty,
        settings.peers.len()
    );

    if !settings.backup_interval.is_zero() {
        let path = backup::backup_path(&settings.backup_dir, &settings.host, settings.port);
        backup::spawn_backup_task(state.ledger.clone(), path, settings.backup_interval);
    }
    if !settings.sync_interval.is_zero() {
        consensus::sync::spawn_sync_task(state.clone(), settings.sync_interval);
    }

    HttpServer::new({
        let state = state.clone();
        move || {
            App::new()
                .app_data(state.clone())
                .configure(api::init_routes)
        }
    })
    .bind((settings.host.as_str(), settings.port))?
    .run()
    .await
}
