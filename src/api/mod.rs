mod chain;
mod error;
mod health;
mod mining;
pub mod models;
mod nodes;
mod ping;
mod stats;
mod system;
mod tx;

use actix_web::web::{self, ServiceConfig};

pub use models::AppState;

/// Every route lives under this prefix; peers are addressed by base URL.
pub const API_PREFIX: &str = "/api/v1";

/// Chain snapshots travel as JSON bodies and outgrow actix's 32 KiB default.
const MAX_JSON_BYTES: usize = 16 * 1024 * 1024;

pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.service(
        web::scope(API_PREFIX)
            .app_data(web::JsonConfig::default().limit(MAX_JSON_BYTES))
            .service(health::health_check)
            .service(tx::post_transaction)
            .service(tx::get_pending)
            .service(mining::mine_block)
            .service(chain::get_chain)
            .service(chain::import_chain)
            .service(nodes::get_nodes)
            .service(nodes::register_nodes)
            .service(nodes::announce)
            .service(nodes::resolve)
            .service(ping::ping_peers)
            .service(ping::pong)
            .service(system::get_system)
            .service(stats::get_stats),
    );
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use actix_web::{App, http::StatusCode, test, web};
    use serde_json::{Value, json};

    use super::*;
    use crate::blockchain::test_support::{flip_last_char, ledger_with};
    use crate::config::Settings;
    use crate::consensus::{Announcement, PeerClient};

    fn state(difficulty: u32) -> web::Data<AppState> {
        let settings = Settings {
            difficulty,
            ..Settings::default()
        };
        let client = PeerClient::new(Duration::from_millis(300)).unwrap();
        web::Data::new(AppState::new(&settings, client))
    }

    macro_rules! app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data($state.clone())
                    .configure(init_routes),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn submit_then_mine() {
        let state = state(2);
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/v1/transactions/new/")
            .set_json(json!({"origin": "alice", "destination": "bob", "amount": 10}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["index"], 2);

        let req = test::TestRequest::get().uri("/api/v1/mine/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["block"]["index"], 2);
        assert_eq!(body["length"], 2);
        assert!(body["block"]["hash"].as_str().unwrap().starts_with("00"));
        // client transaction + reward
        assert_eq!(body["block"]["transactions"].as_array().unwrap().len(), 2);

        let req = test::TestRequest::get()
            .uri("/api/v1/transactions/pending/")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["size"], 0);

        let req = test::TestRequest::get().uri("/api/v1/chain/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["length"], 2);
        assert_eq!(body["chain"][1]["previousHash"], body["chain"][0]["hash"]);
    }

    #[actix_web::test]
    async fn rejects_incomplete_or_negative_transactions() {
        let state = state(2);
        let app = app!(state);

        for payload in [
            json!({"origin": "alice", "amount": 10}),
            json!({"origin": "alice", "destination": "bob", "amount": -1}),
        ] {
            let req = test::TestRequest::post()
                .uri("/api/v1/transactions/new/")
                .set_json(payload)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["error"], "InvalidTransaction");
        }
        assert!(state.ledger.pending_transactions().is_empty());
    }

    #[actix_web::test]
    async fn mining_empty_pool_is_rejected() {
        let state = state(2);
        let app = app!(state);

        let req = test::TestRequest::get().uri("/api/v1/mine/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "NoPendingTransactions");
    }

    #[actix_web::test]
    async fn import_accepts_valid_and_rejects_tampered() {
        let state = state(2);
        let app = app!(state);
        let snapshot = ledger_with(2, 2).export_snapshot();

        let mut tampered = snapshot.clone();
        tampered[2].hash = flip_last_char(&tampered[2].hash);
        let req = test::TestRequest::post()
            .uri("/api/v1/chain/import/")
            .set_json(&tampered)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "CorruptChain");

        let req = test::TestRequest::post()
            .uri("/api/v1/chain/import/")
            .set_json(&snapshot)
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["length"], 3);
        assert_eq!(state.ledger.current_chain(), snapshot);
    }

    #[actix_web::test]
    async fn announcement_applies_longest_chain_rule() {
        let state = state(2);
        let app = app!(state);
        let longer = ledger_with(2, 2).export_snapshot();

        let req = test::TestRequest::post()
            .uri("/api/v1/nodes/announce/")
            .set_json(Announcement {
                nodes: vec!["http://127.0.0.1:5999".into()],
                chain: longer.clone(),
            })
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["adopted"], true);
        assert_eq!(body["length"], 3);
        assert_eq!(state.peer_list(), vec!["http://127.0.0.1:5999"]);

        // The same chain again is only a tie
        let req = test::TestRequest::post()
            .uri("/api/v1/nodes/announce/")
            .set_json(Announcement {
                nodes: vec![],
                chain: longer,
            })
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["adopted"], false);
    }

    #[actix_web::test]
    async fn register_reports_unreachable_peers() {
        let state = state(2);
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/v1/nodes/register/")
            .set_json(json!({"nodes": ["http://127.0.0.1:9/"]}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["total_nodes"], json!(["http://127.0.0.1:9"]));
        assert_eq!(body["failed"], json!(["http://127.0.0.1:9"]));

        let req = test::TestRequest::post()
            .uri("/api/v1/nodes/register/")
            .set_json(json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn pong_answers_with_delay() {
        let state = state(2);
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/api/v1/pong/")
            .set_json(json!({"origin": "http://x", "message": "PING", "sent_at": 0}))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert!(body["reply"].as_str().unwrap().starts_with("PONG"));
        assert!(body["delay_ms"].as_i64().unwrap() > 0);
    }

    #[actix_web::test]
    async fn ping_reports_each_peer() {
        let state = state(2);
        let app = app!(state);

        let req = test::TestRequest::get().uri("/api/v1/ping/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["message"], "all nodes responded");
        assert_eq!(body["results"], json!([]));

        state.add_peers(&["http://127.0.0.1:9".to_string()]);
        let req = test::TestRequest::get().uri("/api/v1/ping/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["message"], "some nodes did not respond");
        let result = &body["results"][0];
        assert_eq!(result["peer"], "http://127.0.0.1:9");
        assert!(result["error"].is_string());
        assert!(result["reply"].is_null());
    }

    #[actix_web::test]
    async fn stats_and_system_report() {
        let state = state(3);
        let app = app!(state);

        let req = test::TestRequest::get().uri("/api/v1/stats/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["height"], 1);
        assert_eq!(body["difficulty"], 3);
        assert_eq!(body["pending_size"], 0);

        let req = test::TestRequest::get().uri("/api/v1/system/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["node_id"], state.node_id.as_str());
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }
}
