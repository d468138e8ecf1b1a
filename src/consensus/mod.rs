pub mod peers;
pub mod resolver;
pub mod sync;

pub use peers::{Announcement, PeerClient, Ping, Pong};
pub use resolver::{ConsensusResolver, PeerPoll, Resolution};
