use actix_web::{HttpResponse, Responder, get, post, web};
use chrono::Utc;
use futures::future::join_all;
use log::debug;

use super::models::{AppState, PingResponse, PingResult};
use crate::consensus::{Ping, Pong};

/// Ping every known peer and report what came back.
#[get("/ping/")]
pub async fn ping_peers(state: web::Data<AppState>) -> impl Responder {
    let peers = state.peer_list();
    let ping = Ping {
        origin: state.node_address.clone(),
        message: "PING".to_string(),
        sent_at: Utc::now().timestamp_millis(),
    };

    let client = &state.peer_client;
    let ping = &ping;
    let results: Vec<PingResult> = join_all(peers.iter().map(|peer| async move {
        match client.ping(peer, ping).await {
            Ok(answer) => PingResult {
                peer: peer.clone(),
                reply: Some(answer.reply),
                delay_ms: Some(answer.delay_ms),
                error: None,
            },
            Err(e) => PingResult {
                peer: e.peer().to_string(),
                reply: None,
                delay_ms: None,
                error: Some(e.to_string()),
            },
        }
    }))
    .await;

    let message = if results.iter().all(|r| r.error.is_none()) {
        "all nodes responded".to_string()
    } else {
        "some nodes did not respond".to_string()
    };
    HttpResponse::Ok().json(PingResponse { message, results })
}

/// Answer a ping with the one-way delay measured on our clock.
#[post("/pong/")]
pub async fn pong(state: web::Data<AppState>, body: web::Json<Ping>) -> impl Responder {
    let delay_ms = Utc::now().timestamp_millis() - body.sent_at;
    debug!("PONG - {} from {} ({delay_ms} ms)", body.message, body.origin);
    HttpResponse::Ok().json(Pong {
        reply: format!("PONG {}", state.node_address),
        delay_ms,
    })
}
