pub mod model;

pub use model::{REWARD_ORIGIN, Transaction};
