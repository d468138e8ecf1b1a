use super::Block;

/// Leading-zero proof of work over the block's hex digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProofOfWork {
    difficulty: u32,
}

impl ProofOfWork {
    pub fn new(difficulty: u32) -> Self {
        Self { difficulty }
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    /// True iff the first `difficulty` hex characters of `hash` are all `'0'`.
    pub fn meets_target(&self, hash: &str) -> bool {
        let d = self.difficulty as usize;
        hash.len() >= d && hash.bytes().take(d).all(|c| c == b'0')
    }

    /// Brute-force the nonce from zero until the block's hash meets the target.
    ///
    /// Expected work is `16^difficulty` hashes. The block's `hash` field is left
    /// untouched; hand the returned value to `Ledger::integrate_block`.
    pub fn mine(&self, block: &mut Block) -> String {
        block.nonce = 0;
        let mut hash = block.compute_hash();
        while !self.meets_target(&hash) {
            block.nonce = block.nonce.wrapping_add(1);
            hash = block.compute_hash();
        }
        hash
    }

    /// Check a claimed hash against the target and against the block as given.
    pub fn verify(&self, block: &Block, claimed_hash: &str) -> bool {
        self.meets_target(claimed_hash) && block.compute_hash() == claimed_hash
    }
}

impl Default for ProofOfWork {
    fn default() -> Self {
        Self::new(super::DEFAULT_DIFFICULTY)
    }
}
