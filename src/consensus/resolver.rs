use log::{debug, info, warn};

use crate::blockchain::{Block, Ledger};
use crate::error::PeerError;

/// Outcome of polling a single peer for its chain.
#[derive(Debug)]
pub struct PeerPoll {
    pub peer: String,
    pub chain: Result<Vec<Block>, PeerError>,
}

impl PeerPoll {
    pub fn snapshot(peer: impl Into<String>, chain: Vec<Block>) -> Self {
        Self {
            peer: peer.into(),
            chain: Ok(chain),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Adopted { peer: String, length: usize },
    Unchanged,
}

/// Longest fully-valid chain wins; ties keep the local chain.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsensusResolver;

impl ConsensusResolver {
    pub fn new() -> Self {
        Self
    }

    /// Compare `local` with every reachable peer snapshot and adopt the longest
    /// one that is strictly longer and survives a full re-import. Unreachable
    /// peers and invalid snapshots are skipped.
    pub fn resolve(&self, local: &mut Ledger, polls: &[PeerPoll]) -> Resolution {
        let local_len = local.len();
        let difficulty = local.difficulty();
        let mut best: Option<(&str, Ledger)> = None;

        for poll in polls {
            let snapshot = match &poll.chain {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    warn!("consensus - skipping {}: {}", poll.peer, e);
                    continue;
                }
            };

            let to_beat = best.as_ref().map_or(local_len, |(_, l)| l.len());
            if snapshot.len() <= to_beat {
                debug!(
                    "consensus - {} offers {} blocks, need more than {}",
                    poll.peer,
                    snapshot.len(),
                    to_beat
                );
                continue;
            }

            match Ledger::import_chain(snapshot, difficulty) {
                Ok(imported) => best = Some((poll.peer.as_str(), imported)),
                Err(e) => warn!("consensus - rejecting chain from {}: {}", poll.peer, e),
            }
        }

        match best {
            Some((peer, imported)) => {
                let length = imported.len();
                local.adopt_chain(imported);
                info!("consensus - adopted chain of {length} blocks from {peer} (was {local_len})");
                Resolution::Adopted {
                    peer: peer.to_string(),
                    length,
                }
            }
            None => Resolution::Unchanged,
        }
    }
}
