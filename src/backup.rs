//! Periodic chain snapshots written to disk.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use log::{debug, info, warn};
use serde::Serialize;

use crate::blockchain::Block;
use crate::service::LedgerService;

#[derive(Serialize)]
struct BackupFile<'a> {
    chain: &'a [Block],
    length: usize,
    date: String,
}

/// `<dir>/backup-node-<host>_<port>.json`
pub fn backup_path(dir: &str, host: &str, port: u16) -> PathBuf {
    Path::new(dir).join(format!("backup-node-{host}_{port}.json"))
}

/// Snapshot the ledger and write it, pretty-printed, to `path`.
pub async fn write_backup(ledger: &LedgerService, path: &Path) -> io::Result<usize> {
    let chain = ledger.current_chain();
    let file = BackupFile {
        chain: &chain,
        length: chain.len(),
        date: Local::now().format("%d/%m/%Y %H:%M:%S").to_string(),
    };
    let body = serde_json::to_vec_pretty(&file).map_err(io::Error::other)?;

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, body).await?;
    Ok(chain.len())
}

pub fn spawn_backup_task(ledger: Arc<LedgerService>, path: PathBuf, every: Duration) {
    info!("BACKUP - writing {} every {}s", path.display(), every.as_secs());
    actix_web::rt::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match write_backup(&ledger, &path).await {
                Ok(length) => debug!("BACKUP - {length} blocks saved to {}", path.display()),
                Err(e) => warn!("BACKUP - failed to write {}: {e}", path.display()),
            }
        }
    });
}
