use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

/// Origin used for the reward transaction a miner adds to its own block.
pub const REWARD_ORIGIN: &str = "0";

/// A value transfer intent waiting in the pool or carried by a block.
///
/// Fields are declared in lexicographic order of their wire names; that order
/// is the canonical one used when a block is hashed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub amount: i64,
    pub created_at: i64, // Unix milliseconds (UTC)
    pub destination: String,
    pub origin: String,
}

impl Transaction {
    /// Validate the fields and stamp the transaction with the current time.
    pub fn new(origin: &str, destination: &str, amount: i64) -> Result<Self, LedgerError> {
        let origin = origin.trim();
        let destination = destination.trim();
        if origin.is_empty() {
            return Err(LedgerError::InvalidTransaction("origin is required".into()));
        }
        if destination.is_empty() {
            return Err(LedgerError::InvalidTransaction(
                "destination is required".into(),
            ));
        }
        if amount < 0 {
            return Err(LedgerError::InvalidTransaction(format!(
                "amount must be non-negative (got {amount})"
            )));
        }

        Ok(Self {
            amount,
            created_at: Utc::now().timestamp_millis(),
            destination: destination.to_string(),
            origin: origin.to_string(),
        })
    }

    /// Reward paid to `miner` for sealing a block.
    pub fn reward(miner: &str, amount: i64) -> Self {
        Self {
            amount,
            created_at: Utc::now().timestamp_millis(),
            destination: miner.to_string(),
            origin: REWARD_ORIGIN.to_string(),
        }
    }
}
