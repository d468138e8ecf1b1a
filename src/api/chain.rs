use actix_web::{HttpResponse, Responder, get, post, web};
use log::warn;

use super::error::ApiError;
use super::models::{AppState, ChainResponse, ImportResponse};
use crate::blockchain::Block;

/// Get the full chain, genesis first.
#[get("/chain/")]
pub async fn get_chain(state: web::Data<AppState>) -> impl Responder {
    let chain = state.ledger.current_chain();
    let resp = ChainResponse {
        length: chain.len(),
        difficulty: state.ledger.difficulty(),
        chain: &chain,
    };
    HttpResponse::Ok().json(resp)
}

/// Replace the local chain with a fully re-verified snapshot.
#[post("/chain/import/")]
pub async fn import_chain(
    state: web::Data<AppState>,
    body: web::Json<Vec<Block>>,
) -> Result<HttpResponse, ApiError> {
    let length = state
        .ledger
        .import_chain(&body)
        .inspect_err(|e| warn!("POST /chain/import/ - rejected: {e}"))?;
    Ok(HttpResponse::Ok().json(ImportResponse {
        message: "chain imported".to_string(),
        length,
    }))
}
