use std::time::Duration;

use actix_web::web;
use log::{debug, info};

use super::Resolution;
use crate::api::AppState;

/// Poll every known peer once and apply the longest-valid-chain rule.
pub async fn sync_once(state: &AppState) -> Resolution {
    let peers = state.peer_list();
    if peers.is_empty() {
        return Resolution::Unchanged;
    }
    let polls = state.peer_client.poll_peers(&peers).await;
    state.ledger.resolve_with_peers(&polls)
}

/// Run `sync_once` forever on a fixed period.
pub fn spawn_sync_task(state: web::Data<AppState>, every: Duration) {
    info!("SYNC - polling peers every {}s", every.as_secs());
    actix_web::rt::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick completes immediately; skip it so a fresh node can
        // finish binding before it polls.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match sync_once(&state).await {
                Resolution::Adopted { peer, length } => {
                    info!("SYNC - adopted {length} blocks from {peer}")
                }
                Resolution::Unchanged => debug!("SYNC - local chain kept"),
            }
        }
    });
}
