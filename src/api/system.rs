use actix_web::{HttpResponse, Responder, get, web};

use super::models::{AppState, SystemResponse};

#[get("/system/")]
pub async fn get_system(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(SystemResponse {
        machine: std::env::consts::ARCH,
        system: std::env::consts::OS,
        family: std::env::consts::FAMILY,
        version: env!("CARGO_PKG_VERSION"),
        node_id: state.node_id.clone(),
        node_address: state.node_address.clone(),
    })
}
