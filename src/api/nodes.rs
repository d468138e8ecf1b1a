use actix_web::{HttpResponse, Responder, get, post, web};
use futures::future::join_all;
use log::{info, warn};

use super::error::ApiError;
use super::models::{
    AppState, NodesResponse, RegisterNodesRequest, RegisterNodesResponse, ResolveResponse,
};
use crate::consensus::{Announcement, PeerPoll, Resolution};

/// List known peers.
#[get("/nodes/")]
pub async fn get_nodes(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(NodesResponse {
        nodes: state.peer_list(),
    })
}

/// Register peers and announce our chain plus the rest of the network to each
/// of them.
#[post("/nodes/register/")]
pub async fn register_nodes(
    state: web::Data<AppState>,
    body: web::Json<RegisterNodesRequest>,
) -> Result<HttpResponse, ApiError> {
    let Some(nodes) = body.into_inner().nodes.filter(|n| !n.is_empty()) else {
        return Err(ApiError::BadRequest("a non-empty list of nodes is required".into()));
    };

    let added = state.add_peers(&nodes);
    let everyone = state.peer_list();
    let chain = state.ledger.current_chain();
    let client = &state.peer_client;

    let announcements = everyone.iter().map(|target| {
        let announcement = Announcement {
            nodes: std::iter::once(state.node_address.clone())
                .chain(everyone.iter().filter(|n| *n != target).cloned())
                .collect(),
            chain: chain.clone(),
        };
        async move {
            let result = client.announce(target, &announcement).await;
            (target.clone(), result)
        }
    });

    let mut failed = Vec::new();
    for (target, result) in join_all(announcements).await {
        if let Err(e) = result {
            warn!("POST /nodes/register/ - announce to {target} failed: {e}");
            failed.push(target);
        }
    }

    info!(
        "POST /nodes/register/ - {added} new peers, {} total, {} unreachable",
        everyone.len(),
        failed.len()
    );
    let message = if failed.is_empty() {
        "new nodes have been added to the network".to_string()
    } else {
        "some nodes could not be notified".to_string()
    };
    Ok(HttpResponse::Created().json(RegisterNodesResponse {
        message,
        total_nodes: everyone,
        failed,
    }))
}

/// Receive another node's announcement: learn its peers, then apply the
/// longest-valid-chain rule to the chain it sent.
#[post("/nodes/announce/")]
pub async fn announce(
    state: web::Data<AppState>,
    body: web::Json<Announcement>,
) -> impl Responder {
    let Announcement { nodes, chain } = body.into_inner();
    state.add_peers(&nodes);

    let polls = [PeerPoll::snapshot("announcement", chain)];
    let outcome = state.ledger.resolve_with_peers(&polls);
    HttpResponse::Ok().json(resolve_response(outcome, state.ledger.status().height, Vec::new()))
}

/// Poll every known peer and adopt the longest valid chain, if any.
#[post("/nodes/resolve/")]
pub async fn resolve(state: web::Data<AppState>) -> impl Responder {
    let polls = state.peer_client.poll_peers(&state.peer_list()).await;
    let unreachable = polls
        .iter()
        .filter(|p| p.chain.is_err())
        .map(|p| p.peer.clone())
        .collect();
    let outcome = state.ledger.resolve_with_peers(&polls);
    HttpResponse::Ok().json(resolve_response(outcome, state.ledger.status().height, unreachable))
}

fn resolve_response(outcome: Resolution, local_len: usize, unreachable: Vec<String>) -> ResolveResponse {
    match outcome {
        Resolution::Adopted { peer, length } => ResolveResponse {
            adopted: true,
            peer: Some(peer),
            length,
            unreachable,
        },
        Resolution::Unchanged => ResolveResponse {
            adopted: false,
            peer: None,
            length: local_len,
            unreachable,
        },
    }
}
