pub mod block;
pub mod model;
pub mod pow;

pub use block::Block;
pub use model::Ledger;
pub use pow::ProofOfWork;

/// Default Proof-of-Work difficulty (number of leading zero hex characters).
pub const DEFAULT_DIFFICULTY: u32 = 4;

/// Previous-hash sentinel carried by every genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

/// Difficulty bounds accepted from configuration.
pub const DIFF_MIN: u32 = 1;
pub const DIFF_MAX: u32 = 6;
