use actix_web::{HttpResponse, Responder, get, web};

use super::models::{AppState, StatsResponse};

#[get("/stats/")]
pub async fn get_stats(state: web::Data<AppState>) -> impl Responder {
    // One short ledger lock, then the peer lock separately
    let status = state.ledger.status();
    let peers = state.peer_list().len();

    HttpResponse::Ok().json(StatsResponse {
        height: status.height,
        difficulty: status.difficulty,
        pending_size: status.pending,
        peers,
        last_interval_ms: status.last_interval_ms,
    })
}
