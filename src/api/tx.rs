use actix_web::{HttpResponse, Responder, get, post, web};
use log::{info, warn};

use super::error::ApiError;
use super::models::{AppState, NewTxRequest, NewTxResponse, PendingResponse};
use crate::error::LedgerError;

/// Submit a new transaction into the pending pool.
#[post("/transactions/new/")]
pub async fn post_transaction(
    state: web::Data<AppState>,
    body: web::Json<NewTxRequest>,
) -> Result<HttpResponse, ApiError> {
    let NewTxRequest {
        origin,
        destination,
        amount,
    } = body.into_inner();

    let (Some(origin), Some(destination), Some(amount)) = (origin, destination, amount) else {
        warn!("POST /transactions/new/ - rejected: missing fields");
        return Err(LedgerError::InvalidTransaction(
            "origin, destination and amount are required".into(),
        )
        .into());
    };

    let index = state
        .ledger
        .submit_transaction(&origin, &destination, amount)
        .inspect_err(|e| warn!("POST /transactions/new/ - rejected: {e}"))?;

    info!("POST /transactions/new/ - {origin} -> {destination} ({amount}) queued for block #{index}");
    Ok(HttpResponse::Created().json(NewTxResponse {
        message: format!("transaction will be included in block {index}"),
        index,
    }))
}

/// List the pending pool.
#[get("/transactions/pending/")]
pub async fn get_pending(state: web::Data<AppState>) -> impl Responder {
    let transactions = state.ledger.pending_transactions();
    HttpResponse::Ok().json(PendingResponse {
        size: transactions.len(),
        transactions,
    })
}
