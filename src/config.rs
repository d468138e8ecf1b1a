//! Environment configuration (optionally loaded from `.env`).

use std::env;
use std::str::FromStr;
use std::time::Duration;

use log::warn;

use crate::blockchain::{DEFAULT_DIFFICULTY, DIFF_MAX, DIFF_MIN};

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    /// Public URL other nodes use to reach us; also the mining reward destination.
    pub node_address: String,
    pub difficulty: u32,
    pub peers: Vec<String>,
    pub peer_timeout: Duration,
    pub mining_reward: i64,
    pub backup_dir: String,
    /// Zero disables the task.
    pub backup_interval: Duration,
    /// Zero disables the task.
    pub sync_interval: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            node_address: "http://127.0.0.1:8080".to_string(),
            difficulty: DEFAULT_DIFFICULTY,
            peers: Vec::new(),
            peer_timeout: Duration::from_secs(5),
            mining_reward: 1,
            backup_dir: "backups".to_string(),
            backup_interval: Duration::from_secs(60),
            sync_interval: Duration::ZERO,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from any key lookup; unparsable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let host = lookup("HOST").unwrap_or(defaults.host);
        let port = parse_or(&lookup, "PORT", defaults.port);
        let node_address = lookup("NODE_ADDRESS").unwrap_or_else(|| format!("http://{host}:{port}"));

        let mut difficulty = parse_or(&lookup, "DIFFICULTY", defaults.difficulty);
        if !(DIFF_MIN..=DIFF_MAX).contains(&difficulty) {
            warn!("DIFFICULTY={difficulty} outside {DIFF_MIN}..={DIFF_MAX}, using {DEFAULT_DIFFICULTY}");
            difficulty = DEFAULT_DIFFICULTY;
        }

        let peers = lookup("PEERS")
            .map(|raw| parse_peer_list(&raw))
            .unwrap_or_default();

        Self {
            host,
            port,
            node_address,
            difficulty,
            peers,
            peer_timeout: Duration::from_secs(parse_or(&lookup, "PEER_TIMEOUT_SECS", 5)),
            mining_reward: parse_or(&lookup, "MINING_REWARD", defaults.mining_reward).max(0),
            backup_dir: lookup("BACKUP_DIR").unwrap_or(defaults.backup_dir),
            backup_interval: Duration::from_secs(parse_or(&lookup, "BACKUP_INTERVAL_SECS", 60)),
            sync_interval: Duration::from_secs(parse_or(&lookup, "SYNC_INTERVAL_SECS", 0)),
        }
    }
}

/// Split a comma-separated list of peer URLs, dropping blanks and trailing slashes.
pub fn parse_peer_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|p| p.trim().trim_end_matches('/'))
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("ignoring invalid {key}={raw:?}");
            default
        }),
        None => default,
    }
}
