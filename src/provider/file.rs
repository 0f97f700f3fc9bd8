//! File data provider
//!
//! Reads a file on demand and watches it from a background thread.
//!
//! ## Change Detection
//! The monitor thread fingerprints the file every `poll_interval_ms`:
//! existence, size, modification time and (for links) the link target.
//! Any difference raises the update flag. The flag is edge-triggered:
//! [`FileDataProvider::has_update`] returns true once per burst of changes.
//!
//! ```text
//!   monitor ── change ──► flag = true
//!   caller  ── has_update() ──► swap(flag, false)
//! ```

use std::fs::{self, Metadata};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime};

use crossbeam::channel::{self, RecvTimeoutError, Sender};
use parking_lot::Mutex;

use crate::config::Config;
use crate::error::{Result, WireError};

// =============================================================================
// Fingerprint
// =============================================================================

/// What the monitor compares between polls
#[derive(Debug, Clone, PartialEq, Eq)]
struct Fingerprint {
    exists: bool,
    len: u64,
    modified: Option<SystemTime>,
    link_target: Option<PathBuf>,
}

impl Fingerprint {
    fn capture(path: &Path, follow_symlinks: bool) -> Self {
        let metadata = if follow_symlinks {
            fs::metadata(path)
        } else {
            fs::symlink_metadata(path)
        };

        match metadata {
            Ok(meta) => Self::from_metadata(path, &meta),
            Err(_) => Self {
                exists: false,
                len: 0,
                modified: None,
                link_target: fs::read_link(path).ok(),
            },
        }
    }

    fn from_metadata(path: &Path, meta: &Metadata) -> Self {
        Self {
            exists: true,
            len: meta.len(),
            modified: meta.modified().ok(),
            // Relinking to a file with identical size and mtime still counts
            link_target: fs::read_link(path).ok(),
        }
    }
}

// =============================================================================
// FileDataProvider
// =============================================================================

/// Reads a file and tracks whether it changed since the last check
pub struct FileDataProvider {
    path: PathBuf,
    updated: Arc<Mutex<bool>>,
    stop_tx: Option<Sender<()>>,
    monitor: Option<JoinHandle<()>>,
}

impl FileDataProvider {
    /// Start watching `path` with default settings
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        Self::with_config(path, &Config::default())
    }

    /// Start watching `path`.
    ///
    /// The file does not have to exist yet; its appearance counts as a change.
    pub fn with_config(path: impl Into<PathBuf>, config: &Config) -> Result<Self> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(WireError::Config("File path empty".to_string()));
        }
        config.validate()?;

        let updated = Arc::new(Mutex::new(false));
        let (stop_tx, stop_rx) = channel::bounded::<()>(1);
        let interval = Duration::from_millis(config.poll_interval_ms);
        let follow_symlinks = config.follow_symlinks;

        // Baseline is taken before the thread exists so no early change is lost
        let mut last = Fingerprint::capture(&path, follow_symlinks);

        let monitor = {
            let path = path.clone();
            let updated = Arc::clone(&updated);
            thread::Builder::new()
                .name("mcwire-file-monitor".to_string())
                .spawn(move || loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }

                    let current = Fingerprint::capture(&path, follow_symlinks);
                    if current != last {
                        tracing::debug!(path = %path.display(), exists = current.exists, "watched file changed");
                        *updated.lock() = true;
                        last = current;
                    }
                })
                .map_err(|e| WireError::Watch(format!("failed to start monitor thread: {}", e)))?
        };

        tracing::debug!(path = %path.display(), interval_ms = config.poll_interval_ms, "file monitor started");

        Ok(Self {
            path,
            updated,
            stop_tx: Some(stop_tx),
            monitor: Some(monitor),
        })
    }

    /// The watched path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole file
    pub fn load(&self) -> Result<Vec<u8>> {
        fs::read(&self.path).map_err(|source| {
            tracing::warn!(path = %self.path.display(), error = %source, "failed to read file");
            WireError::FileRead {
                path: self.path.clone(),
                source,
            }
        })
    }

    /// True if the file changed since the previous call. Clears the flag.
    pub fn has_update(&self) -> bool {
        std::mem::replace(&mut *self.updated.lock(), false)
    }
}

impl Drop for FileDataProvider {
    fn drop(&mut self) {
        // Dropping the sender also disconnects the channel
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.try_send(());
        }
        if let Some(handle) = self.monitor.take() {
            if handle.join().is_err() {
                tracing::warn!(path = %self.path.display(), "file monitor thread panicked");
            }
        }
        tracing::debug!(path = %self.path.display(), "file monitor stopped");
    }
}

impl std::fmt::Debug for FileDataProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileDataProvider")
            .field("path", &self.path)
            .field("updated", &*self.updated.lock())
            .finish()
    }
}
