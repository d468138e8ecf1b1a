use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::GENESIS_PREVIOUS_HASH;
use crate::transaction::Transaction;

/// A single block in the ledger holding an ordered batch of transactions.
///
/// The serde form of this struct is the wire/backup representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub index: u64,
    pub transactions: Vec<Transaction>,
    pub created_at: i64, // Unix milliseconds (UTC)
    pub previous_hash: String,
    pub nonce: u64,   // Proof-of-Work nonce
    pub hash: String, // empty until the block is mined
}

/// Canonical hashing preimage: every block field except `hash`, keys in
/// lexicographic order so any implementation can reproduce the digest.
#[derive(Serialize)]
struct HashPreimage<'a> {
    #[serde(rename = "createdAt")]
    created_at: i64,
    index: u64,
    nonce: u64,
    #[serde(rename = "previousHash")]
    previous_hash: &'a str,
    transactions: &'a [Transaction],
}

impl Block {
    /// Create the genesis block (index 1, no transactions, sentinel previous hash).
    pub fn genesis(created_at: i64) -> Self {
        let mut block = Self {
            index: 1,
            transactions: Vec::new(),
            created_at,
            previous_hash: GENESIS_PREVIOUS_HASH.to_string(),
            nonce: 0,
            hash: String::new(),
        };
        block.hash = block.compute_hash();
        block
    }

    /// Create a new block (not mined yet). Run it through `ProofOfWork::mine`.
    pub fn new(index: u64, previous_hash: String, transactions: Vec<Transaction>) -> Self {
        Self {
            index,
            transactions,
            created_at: Utc::now().timestamp_millis(),
            previous_hash,
            nonce: 0,
            hash: String::new(),
        }
    }

    /// SHA-256 over the canonical JSON encoding of every field except `hash`,
    /// rendered as 64 lowercase hex characters.
    pub fn compute_hash(&self) -> String {
        let preimage = HashPreimage {
            created_at: self.created_at,
            index: self.index,
            nonce: self.nonce,
            previous_hash: &self.previous_hash,
            transactions: &self.transactions,
        };
        let encoded = serde_json::to_vec(&preimage).expect("serialize block preimage");
        let mut hasher = Sha256::new();
        hasher.update(&encoded);
        let digest = hasher.finalize();
        hex::encode(digest)
    }

    pub fn is_genesis_shaped(&self) -> bool {
        self.index == 1
            && self.transactions.is_empty()
            && self.previous_hash == GENESIS_PREVIOUS_HASH
            && self.nonce == 0
    }
}
