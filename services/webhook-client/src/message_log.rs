//! Append-only message log
//!
//! A single text file recording every webhook delivery. Appends from
//! concurrent deliveries are serialized through a tokio Mutex so entries never
//! interleave. Failures are reported to the caller and never fatal: the
//! service keeps answering other routes when the file is unavailable.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Handle to the log file.
pub struct MessageLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl MessageLog {
    /// Open the log at `path`, creating it and its parent directory if missing.
    ///
    /// A creation failure is logged and the handle is still returned; later
    /// reads and appends report the error individually.
    pub async fn open(path: PathBuf) -> Self {
        match create_if_missing(&path).await {
            Ok(true) => info!(path = %path.display(), "created message log"),
            Ok(false) => debug!(path = %path.display(), "using existing message log"),
            Err(e) => warn!(path = %path.display(), error = %e, "message log is not accessible"),
        }
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `text` to the end of the log.
    pub async fn append(&self, text: &str) -> common::Result<()> {
        let _guard = self.lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(text.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Read the whole log.
    pub async fn read(&self) -> common::Result<String> {
        let _guard = self.lock.lock().await;
        Ok(tokio::fs::read_to_string(&self.path).await?)
    }
}

/// Returns true when the file was created.
async fn create_if_missing(path: &Path) -> std::io::Result<bool> {
    if tokio::fs::try_exists(path).await? {
        return Ok(false);
    }
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir).await?;
    }
    tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    Ok(true)
}
