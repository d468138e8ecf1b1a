use std::time::Duration;

use futures::future::join_all;
use log::{debug, warn};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::PeerPoll;
use crate::api::API_PREFIX;
use crate::blockchain::Block;
use crate::error::PeerError;

/// Body of `GET /chain/` as seen by another node.
#[derive(Debug, Deserialize)]
pub struct ChainEnvelope {
    pub length: usize,
    pub chain: Vec<Block>,
}

/// Pushed to a freshly registered peer: the rest of the network plus our chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Announcement {
    pub nodes: Vec<String>,
    pub chain: Vec<Block>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ping {
    pub origin: String,
    pub message: String,
    pub sent_at: i64, // Unix milliseconds
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pong {
    pub reply: String,
    pub delay_ms: i64,
}

/// HTTP client for talking to other nodes. Every request carries the same
/// bounded timeout, so one slow peer never stalls the others.
#[derive(Debug, Clone)]
pub struct PeerClient {
    client: Client,
}

impl PeerClient {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Fetch a peer's full chain snapshot.
    pub async fn fetch_chain(&self, peer: &str) -> Result<Vec<Block>, PeerError> {
        let url = endpoint(peer, "/chain/");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| unreachable(peer, e))?;
        let envelope: ChainEnvelope = decode(peer, response).await?;
        debug!("PEER {} reported {} blocks", peer, envelope.length);
        Ok(envelope.chain)
    }

    /// Poll every peer concurrently. Failures are recorded per peer.
    pub async fn poll_peers(&self, peers: &[String]) -> Vec<PeerPoll> {
        let polls = peers.iter().map(|peer| async move {
            let chain = self.fetch_chain(peer).await;
            if let Err(e) = &chain {
                warn!("PEER {peer} - poll failed: {e}");
            }
            PeerPoll {
                peer: peer.clone(),
                chain,
            }
        });
        join_all(polls).await
    }

    pub async fn announce(&self, peer: &str, announcement: &Announcement) -> Result<(), PeerError> {
        let url = endpoint(peer, "/nodes/announce/");
        let response = self
            .client
            .post(&url)
            .json(announcement)
            .send()
            .await
            .map_err(|e| unreachable(peer, e))?;
        check_status(peer, &response)?;
        Ok(())
    }

    pub async fn ping(&self, peer: &str, ping: &Ping) -> Result<Pong, PeerError> {
        let url = endpoint(peer, "/pong/");
        let response = self
            .client
            .post(&url)
            .json(ping)
            .send()
            .await
            .map_err(|e| unreachable(peer, e))?;
        decode(peer, response).await
    }
}

fn endpoint(peer: &str, path: &str) -> String {
    format!("{}{}{}", peer.trim_end_matches('/'), API_PREFIX, path)
}

fn unreachable(peer: &str, e: reqwest::Error) -> PeerError {
    PeerError::Unreachable {
        peer: peer.to_string(),
        reason: e.to_string(),
    }
}

fn check_status(peer: &str, response: &reqwest::Response) -> Result<(), PeerError> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(PeerError::BadStatus {
            peer: peer.to_string(),
            status: status.as_u16(),
        })
    }
}

async fn decode<T: DeserializeOwned>(peer: &str, response: reqwest::Response) -> Result<T, PeerError> {
    check_status(peer, &response)?;
    response.json::<T>().await.map_err(|e| PeerError::Decode {
        peer: peer.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_prefix() {
        assert_eq!(
            endpoint("http://127.0.0.1:5002/", "/chain/"),
            "http://127.0.0.1:5002/api/v1/chain/"
        );
    }

    #[actix_web::test]
    async fn unreachable_peer_is_isolated() {
        let client = PeerClient::new(Duration::from_millis(500)).unwrap();
        // Port 9 (discard) on localhost is almost never listening.
        let peers = vec!["http://127.0.0.1:9".to_string()];
        let polls = client.poll_peers(&peers).await;

        assert_eq!(polls.len(), 1);
        assert_eq!(polls[0].peer, "http://127.0.0.1:9");
        assert!(matches!(polls[0].chain, Err(PeerError::Unreachable { .. })));
    }
}
