use chrono::Utc;
use log::debug;

use super::{Block, ProofOfWork};
use crate::error::{LedgerError, Result};
use crate::transaction::Transaction;

/// In-memory chain plus the pool of transactions waiting for a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ledger {
    chain: Vec<Block>,
    pending: Vec<Transaction>,
    pow: ProofOfWork,
}

impl Ledger {
    /// Initialize a new ledger with a freshly stamped genesis block.
    pub fn new(difficulty: u32) -> Self {
        Self::with_genesis(Block::genesis(Utc::now().timestamp_millis()), difficulty)
    }

    fn with_genesis(genesis: Block, difficulty: u32) -> Self {
        Self {
            chain: vec![genesis],
            pending: Vec::new(),
            pow: ProofOfWork::new(difficulty),
        }
    }

    /// Return the last block in the chain.
    pub fn last_block(&self) -> &Block {
        self.chain
            .last()
            .expect("ledger always holds at least the genesis block")
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn difficulty(&self) -> u32 {
        self.pow.difficulty()
    }

    pub fn pow(&self) -> ProofOfWork {
        self.pow
    }

    /// Queue a transaction. Returns the index of the block expected to carry it;
    /// advisory only, a chain replacement before mining can change it.
    pub fn submit_transaction(
        &mut self,
        origin: &str,
        destination: &str,
        amount: i64,
    ) -> Result<u64> {
        let tx = Transaction::new(origin, destination, amount)?;
        self.pending.push(tx);
        Ok(self.next_index())
    }

    /// Unmined block over a snapshot of the pending pool. Does not mutate the ledger.
    pub fn create_candidate_block(&self) -> Block {
        Block::new(
            self.next_index(),
            self.last_block().hash.clone(),
            self.pending.clone(),
        )
    }

    /// The only way a block enters the chain.
    ///
    /// Checks the proof first, then linkage to the tip. On success the block is
    /// sealed with `proven_hash`, appended, and the transactions it carried leave
    /// the pool.
    pub fn integrate_block(&mut self, mut candidate: Block, proven_hash: &str) -> Result<&Block> {
        if !self.pow.verify(&candidate, proven_hash) {
            return Err(LedgerError::ProofInvalid {
                index: candidate.index,
            });
        }

        let tip = self.last_block();
        if candidate.previous_hash != tip.hash || candidate.index != tip.index + 1 {
            return Err(LedgerError::ChainMismatch {
                index: candidate.index,
                expected: tip.hash.clone(),
                found: candidate.previous_hash,
            });
        }

        candidate.hash = proven_hash.to_string();
        let before = self.pending.len();
        // Candidates are cut from the front of the pool; only that prefix leaves.
        let carried = self
            .pending
            .iter()
            .zip(&candidate.transactions)
            .take_while(|(queued, mined)| queued == mined)
            .count();
        self.pending.drain(..carried);
        debug!(
            "integrated block #{} ({} txs); pending {} -> {}",
            candidate.index,
            candidate.transactions.len(),
            before,
            self.pending.len()
        );
        self.chain.push(candidate);
        Ok(self.last_block())
    }

    /// Copy of the chain in transport form, genesis first.
    pub fn export_snapshot(&self) -> Vec<Block> {
        self.chain.clone()
    }

    /// Rebuild a ledger from a peer or backup snapshot, re-verifying every link.
    ///
    /// The genesis block is replayed from its reported timestamp; every later
    /// block goes through `integrate_block` with the hash it claims. The first
    /// failing position (0-based) is reported and nothing is kept.
    pub fn import_chain(snapshot: &[Block], difficulty: u32) -> Result<Self> {
        let reported = snapshot.first().ok_or_else(|| LedgerError::CorruptChain {
            index: 0,
            reason: "snapshot is empty".into(),
        })?;

        let genesis = Block::genesis(reported.created_at);
        if !reported.is_genesis_shaped() || genesis.hash != reported.hash {
            return Err(LedgerError::CorruptChain {
                index: 0,
                reason: "genesis block does not match its recomputed form".into(),
            });
        }

        let mut ledger = Self::with_genesis(genesis, difficulty);
        for (position, block) in snapshot.iter().enumerate().skip(1) {
            let mut candidate = block.clone();
            let claimed = std::mem::take(&mut candidate.hash);
            ledger
                .integrate_block(candidate, &claimed)
                .map_err(|e| LedgerError::CorruptChain {
                    index: position,
                    reason: e.to_string(),
                })?;
        }
        Ok(ledger)
    }

    /// Replace chain and pending pool wholesale with those of `other`.
    pub fn adopt_chain(&mut self, other: Ledger) {
        self.chain = other.chain;
        self.pending = other.pending;
    }

    fn next_index(&self) -> u64 {
        self.chain.len() as u64 + 1
    }
}
