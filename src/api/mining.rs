use std::sync::Arc;

use actix_web::{HttpResponse, get, web};
use log::{info, warn};

use super::error::ApiError;
use super::models::{AppState, MineResponse};
use crate::consensus::Resolution;
use crate::error::LedgerError;

/// Mine the pending pool into a new block.
///
/// Peers are consulted first: if one of them holds a longer valid chain it is
/// adopted instead and nothing is mined on the stale tip. The proof-of-work
/// search runs on the blocking pool without holding the ledger lock.
#[get("/mine/")]
pub async fn mine_block(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    if state.ledger.pending_transactions().is_empty() {
        return Err(LedgerError::NoPendingTransactions.into());
    }

    let peers = state.peer_list();
    if !peers.is_empty() {
        let polls = state.peer_client.poll_peers(&peers).await;
        if let Resolution::Adopted { peer, length } = state.ledger.resolve_with_peers(&polls) {
            warn!("MINER - tip superseded by {peer}; adopted {length} blocks instead of mining");
            return Ok(HttpResponse::Ok().json(MineResponse {
                message: format!("conflict: chain replaced by a longer one from {peer}"),
                length,
                block: None,
            }));
        }
    }

    let ledger = Arc::clone(&state.ledger);
    let block = web::block(move || ledger.mine_next_block()).await??;
    info!("MINER - block #{} accepted", block.index);

    Ok(HttpResponse::Ok().json(MineResponse {
        message: "new block mined".to_string(),
        length: block.index as usize,
        block: Some(block),
    }))
}
