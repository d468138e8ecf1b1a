use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::blockchain::Block;
use crate::config::Settings;
use crate::consensus::PeerClient;
use crate::service::LedgerService;
use crate::transaction::Transaction;

/// Shared application state: the ledger service, the peer set and the client
/// used to reach those peers.
pub struct AppState {
    pub ledger: Arc<LedgerService>,
    pub peers: Mutex<BTreeSet<String>>,
    pub peer_client: PeerClient,
    pub node_id: String,
    pub node_address: String,
}

impl AppState {
    pub fn new(settings: &Settings, peer_client: PeerClient) -> Self {
        let state = Self {
            ledger: Arc::new(LedgerService::new(
                settings.difficulty,
                settings.node_address.clone(),
                settings.mining_reward,
            )),
            peers: Mutex::new(BTreeSet::new()),
            peer_client,
            node_id: uuid::Uuid::new_v4().to_string(),
            node_address: settings.node_address.clone(),
        };
        state.add_peers(&settings.peers);
        state
    }

    /// Peers in a stable (sorted) order.
    pub fn peer_list(&self) -> Vec<String> {
        let peers = self.peers.lock().expect("mutex poisoned");
        peers.iter().cloned().collect()
    }

    /// Add peers, ignoring blanks and our own address. Returns how many were new.
    pub fn add_peers(&self, nodes: &[String]) -> usize {
        let mut peers = self.peers.lock().expect("mutex poisoned");
        let before = peers.len();
        for node in nodes {
            let node = node.trim().trim_end_matches('/');
            if !node.is_empty() && node != self.node_address {
                peers.insert(node.to_string());
            }
        }
        peers.len() - before
    }
}

/* ---------- Transaction API Models ---------- */

/// Fields are optional so a missing one surfaces as `InvalidTransaction`
/// rather than a generic deserialization failure.
#[derive(Deserialize)]
pub struct NewTxRequest {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub amount: Option<i64>,
}

#[derive(Serialize)]
pub struct NewTxResponse {
    pub message: String,
    pub index: u64,
}

#[derive(Serialize)]
pub struct PendingResponse {
    pub size: usize,
    pub transactions: Vec<Transaction>,
}

/* ---------- Chain API Models ---------- */

#[derive(Serialize)]
pub struct ChainResponse<'a> {
    pub length: usize,
    pub difficulty: u32,
    pub chain: &'a [Block],
}

#[derive(Serialize)]
pub struct ImportResponse {
    pub message: String,
    pub length: usize,
}

/* ---------- Mining API Models ---------- */

#[derive(Serialize)]
pub struct MineResponse {
    pub message: String,
    pub length: usize,
    pub block: Option<Block>,
}

/* ---------- Node API Models ---------- */

#[derive(Deserialize)]
pub struct RegisterNodesRequest {
    pub nodes: Option<Vec<String>>,
}

#[derive(Serialize)]
pub struct RegisterNodesResponse {
    pub message: String,
    pub total_nodes: Vec<String>,
    pub failed: Vec<String>,
}

#[derive(Serialize)]
pub struct NodesResponse {
    pub nodes: Vec<String>,
}

#[derive(Serialize)]
pub struct ResolveResponse {
    pub adopted: bool,
    pub peer: Option<String>,
    pub length: usize,
    pub unreachable: Vec<String>,
}

#[derive(Serialize)]
pub struct PingResult {
    pub peer: String,
    pub reply: Option<String>,
    pub delay_ms: Option<i64>,
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct PingResponse {
    pub message: String,
    pub results: Vec<PingResult>,
}

/* ---------- Node Info Models ---------- */

#[derive(Serialize)]
pub struct SystemResponse {
    pub machine: &'static str,
    pub system: &'static str,
    pub family: &'static str,
    pub version: &'static str,
    pub node_id: String,
    pub node_address: String,
}

#[derive(Serialize)]
pub struct StatsResponse {
    pub height: usize,
    pub difficulty: u32,
    pub pending_size: usize,
    pub peers: usize,
    pub last_interval_ms: Option<i64>,
}
