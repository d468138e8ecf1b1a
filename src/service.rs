//! Process-wide owner of the ledger. Every handler goes through this type;
//! the ledger itself is never reachable without taking its lock.

use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use log::{debug, info};

use crate::blockchain::{Block, Ledger};
use crate::consensus::{ConsensusResolver, PeerPoll, Resolution};
use crate::error::{LedgerError, Result};
use crate::transaction::Transaction;

/// Point-in-time summary of the ledger for stats endpoints.
#[derive(Debug, Clone)]
pub struct LedgerStatus {
    pub height: usize,
    pub difficulty: u32,
    pub pending: usize,
    pub last_interval_ms: Option<i64>,
}

pub struct LedgerService {
    ledger: Mutex<Ledger>,
    resolver: ConsensusResolver,
    miner_address: String,
    mining_reward: i64,
}

impl LedgerService {
    pub fn new(difficulty: u32, miner_address: impl Into<String>, mining_reward: i64) -> Self {
        Self::from_ledger(Ledger::new(difficulty), miner_address, mining_reward)
    }

    pub fn from_ledger(ledger: Ledger, miner_address: impl Into<String>, mining_reward: i64) -> Self {
        Self {
            ledger: Mutex::new(ledger),
            resolver: ConsensusResolver::new(),
            miner_address: miner_address.into(),
            mining_reward,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Ledger> {
        self.ledger.lock().expect("mutex poisoned")
    }

    pub fn submit_transaction(&self, origin: &str, destination: &str, amount: i64) -> Result<u64> {
        let index = self.lock().submit_transaction(origin, destination, amount)?;
        debug!("LEDGER - queued {origin} -> {destination} ({amount}) for block #{index}");
        Ok(index)
    }

    /// Candidate → mine → integrate.
    ///
    /// Blocks the calling thread for the whole search; the lock is only held
    /// while the candidate is built and while it is integrated. A
    /// `ChainMismatch` means the tip moved meanwhile and the caller may retry.
    pub fn mine_next_block(&self) -> Result<Block> {
        let (mut candidate, pow) = {
            let ledger = self.lock();
            if ledger.pending().is_empty() {
                return Err(LedgerError::NoPendingTransactions);
            }
            (ledger.create_candidate_block(), ledger.pow())
        };

        if self.mining_reward > 0 {
            candidate
                .transactions
                .push(Transaction::reward(&self.miner_address, self.mining_reward));
        }

        let started = Instant::now();
        let hash = pow.mine(&mut candidate);
        debug!(
            "MINER - found nonce {} for block #{} in {} ms",
            candidate.nonce,
            candidate.index,
            started.elapsed().as_millis()
        );

        let mut ledger = self.lock();
        let block = ledger.integrate_block(candidate, &hash)?.clone();
        info!(
            "MINER - sealed block #{} (hash={}, nonce={}, txs={})",
            block.index,
            block.hash,
            block.nonce,
            block.transactions.len()
        );
        Ok(block)
    }

    /// Consistent copy of the chain; the lock is held only for the clone.
    pub fn current_chain(&self) -> Vec<Block> {
        self.lock().export_snapshot()
    }

    pub fn pending_transactions(&self) -> Vec<Transaction> {
        self.lock().pending().to_vec()
    }

    pub fn difficulty(&self) -> u32 {
        self.lock().difficulty()
    }

    /// Validate `snapshot` in full and replace the local chain with it.
    /// Returns the new chain length.
    pub fn import_chain(&self, snapshot: &[Block]) -> Result<usize> {
        let difficulty = self.difficulty();
        let imported = Ledger::import_chain(snapshot, difficulty)?;
        let length = imported.len();
        self.lock().adopt_chain(imported);
        info!("LEDGER - imported chain of {length} blocks");
        Ok(length)
    }

    /// Apply the longest-valid-chain rule against already polled peers.
    pub fn resolve_with_peers(&self, polls: &[PeerPoll]) -> Resolution {
        let mut ledger = self.lock();
        self.resolver.resolve(&mut ledger, polls)
    }

    pub fn status(&self) -> LedgerStatus {
        let ledger = self.lock();
        let chain = ledger.chain();
        let last_interval_ms = match chain {
            [.., older, newer] => Some((newer.created_at - older.created_at).max(0)),
            _ => None,
        };
        LedgerStatus {
            height: ledger.len(),
            difficulty: ledger.difficulty(),
            pending: ledger.pending().len(),
            last_interval_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use super::*;
    use crate::blockchain::test_support::{flip_last_char, ledger_with};
    use crate::transaction::REWARD_ORIGIN;

    #[test]
    fn mine_next_block_from_genesis() {
        let service = LedgerService::new(4, "http://me", 0);
        service.submit_transaction("alice", "bob", 10).unwrap();
        service.submit_transaction("bob", "carol", 4).unwrap();
        let genesis_hash = service.current_chain()[0].hash.clone();

        let block = service.mine_next_block().unwrap();
        assert_eq!(block.index, 2);
        assert_eq!(block.transactions.len(), 2);
        assert_eq!(block.previous_hash, genesis_hash);
        assert!(block.hash.starts_with("0000"));
        assert!(service.pending_transactions().is_empty());
        assert_eq!(service.current_chain().len(), 2);
    }

    #[test]
    fn reward_is_appended_to_the_block() {
        let service = LedgerService::new(2, "http://me", 1);
        service.submit_transaction("alice", "bob", 10).unwrap();

        let block = service.mine_next_block().unwrap();
        let reward = block.transactions.last().unwrap();
        assert_eq!(block.transactions.len(), 2);
        assert_eq!(reward.origin, REWARD_ORIGIN);
        assert_eq!(reward.destination, "http://me");
        assert_eq!(reward.amount, 1);
    }

    #[test]
    fn nothing_to_mine() {
        let service = LedgerService::new(2, "http://me", 1);
        assert_eq!(
            service.mine_next_block().unwrap_err(),
            LedgerError::NoPendingTransactions
        );
        assert_eq!(service.current_chain().len(), 1);
    }

    #[test]
    fn import_replaces_or_rejects() {
        let service = LedgerService::new(2, "http://me", 0);
        let source = ledger_with(3, 2).export_snapshot();

        let mut tampered = source.clone();
        tampered[1].hash = flip_last_char(&tampered[1].hash);
        assert!(matches!(
            service.import_chain(&tampered),
            Err(LedgerError::CorruptChain { index: 1, .. })
        ));
        assert_eq!(service.current_chain().len(), 1);

        assert_eq!(service.import_chain(&source).unwrap(), 4);
        assert_eq!(service.current_chain(), source);
    }

    #[test]
    fn resolves_against_polled_snapshots() {
        let service = LedgerService::from_ledger(ledger_with(1, 2), "http://me", 0);
        let longer = ledger_with(2, 2).export_snapshot();

        let outcome = service.resolve_with_peers(&[PeerPoll::snapshot("http://p", longer.clone())]);
        assert_eq!(
            outcome,
            Resolution::Adopted {
                peer: "http://p".into(),
                length: 3
            }
        );
        assert_eq!(service.current_chain(), longer);
    }

    #[test]
    fn ledger_stays_usable_while_mining() {
        let service = Arc::new(LedgerService::new(5, "http://me", 0));
        service.submit_transaction("alice", "bob", 10).unwrap();

        let miner = {
            let service = Arc::clone(&service);
            thread::spawn(move || service.mine_next_block())
        };
        thread::sleep(Duration::from_millis(20));

        let started = Instant::now();
        assert_eq!(service.submit_transaction("late", "bob", 1).unwrap(), 2);
        assert_eq!(service.current_chain().len(), 1);
        assert!(started.elapsed() < Duration::from_millis(500));

        let block = miner.join().unwrap().unwrap();
        assert_eq!(block.index, 2);
        assert_eq!(block.transactions.len(), 1);
        let pending = service.pending_transactions();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].origin, "late");
    }

    #[test]
    fn concurrent_submit_and_mine_keep_invariants() {
        let service = Arc::new(LedgerService::new(2, "http://me", 1));
        service.submit_transaction("seed", "bob", 1).unwrap();

        let submitters: Vec<_> = (0..4)
            .map(|t| {
                let service = Arc::clone(&service);
                thread::spawn(move || {
                    for i in 0..10 {
                        service
                            .submit_transaction(&format!("t{t}"), "bob", i)
                            .unwrap();
                    }
                })
            })
            .collect();

        let miner = {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                for _ in 0..3 {
                    match service.mine_next_block() {
                        Ok(_) | Err(LedgerError::NoPendingTransactions) => {}
                        Err(e) => panic!("unexpected mining error: {e}"),
                    }
                }
            })
        };

        for h in submitters {
            h.join().unwrap();
        }
        miner.join().unwrap();

        let chain = service.current_chain();
        for (i, pair) in chain.windows(2).enumerate() {
            assert_eq!(pair[1].previous_hash, pair[0].hash);
            assert_eq!(pair[1].index, i as u64 + 2);
        }

        // Every submitted transaction is either on chain or still pending.
        let mined: usize = chain
            .iter()
            .flat_map(|b| &b.transactions)
            .filter(|tx| tx.origin != REWARD_ORIGIN)
            .count();
        assert_eq!(mined + service.pending_transactions().len(), 41);
    }
}
