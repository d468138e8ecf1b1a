//! Error types for the ledger core and the peer client.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("invalid transaction: {0}")]
    InvalidTransaction(String),

    #[error("proof of work rejected for block #{index}")]
    ProofInvalid { index: u64 },

    /// The candidate does not extend the current tip. Recoverable: rebuild the
    /// candidate from the new tip and mine again.
    #[error("block #{index} does not extend the tip (expected previous hash {expected}, got {found})")]
    ChainMismatch {
        index: u64,
        expected: String,
        found: String,
    },

    /// `index` is the 0-based position in the rejected snapshot.
    #[error("corrupt chain at position {index}: {reason}")]
    CorruptChain { index: usize, reason: String },

    #[error("no pending transactions to mine")]
    NoPendingTransactions,
}

#[derive(Debug, Error)]
pub enum PeerError {
    #[error("peer {peer} unreachable: {reason}")]
    Unreachable { peer: String, reason: String },

    #[error("peer {peer} answered with status {status}")]
    BadStatus { peer: String, status: u16 },

    #[error("peer {peer} sent an unreadable response: {reason}")]
    Decode { peer: String, reason: String },
}

impl PeerError {
    pub fn peer(&self) -> &str {
        match self {
            PeerError::Unreachable { peer, .. }
            | PeerError::BadStatus { peer, .. }
            | PeerError::Decode { peer, .. } => peer,
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
