//! Per-repository session lock
//!
//! Two sessions mutating the same work tree would race on the index and the
//! stash. The lock file is created with create-new semantics so the second
//! session fails fast; it is removed when the holder drops it, on success
//! and failure alike. Stale locks are never broken automatically.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Lock file name inside the git metadata directory
pub const LOCK_FILE_NAME: &str = "git-autosync.lock";

/// Metadata written into the lock file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockMeta {
    /// Process holding the lock
    pub pid: u32,
    /// Host the holding process runs on
    #[serde(default)]
    pub host: String,
    /// When the lock was taken
    pub started_at: DateTime<Utc>,
}

impl LockMeta {
    fn current() -> Self {
        Self {
            pid: std::process::id(),
            host: current_host(),
            started_at: Utc::now(),
        }
    }

    fn describe(&self) -> String {
        let host = if self.host.is_empty() {
            "unknown host"
        } else {
            self.host.as_str()
        };
        format!(
            "pid {} on {host} since {}",
            self.pid,
            self.started_at.to_rfc3339()
        )
    }
}

fn current_host() -> String {
    whoami::fallible::hostname().unwrap_or_else(|_| "unknown".into())
}

/// Held session lock; released on drop
#[derive(Debug)]
pub struct SessionLock {
    path: PathBuf,
    meta: LockMeta,
    released: bool,
}

impl SessionLock {
    /// Take the lock for the repository whose metadata lives in `git_dir`
    pub fn acquire(git_dir: &Path) -> Result<Self> {
        let path = git_dir.join(LOCK_FILE_NAME);
        reject_symlink(&path)?;

        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                let holder = read_lock_meta(&path).map_or_else(
                    |e| format!("unreadable metadata: {e}"),
                    |meta| meta.describe(),
                );
                return Err(Error::SessionLocked { path, holder });
            }
            Err(err) => return Err(err.into()),
        };

        let meta = LockMeta::current();
        let lock = Self {
            path,
            meta,
            released: false,
        };
        let bytes = serde_json::to_vec(&lock.meta).map_err(|e| lock.error(e.to_string()))?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        debug!(path = %lock.path.display(), pid = lock.meta.pid, "session lock acquired");
        Ok(lock)
    }

    /// Lock file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Metadata of this lock
    pub const fn meta(&self) -> &LockMeta {
        &self.meta
    }

    /// Release the lock, reporting any failure to remove the file
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        fs::remove_file(&self.path)?;
        debug!(path = %self.path.display(), "session lock released");
        Ok(())
    }

    fn error(&self, message: String) -> Error {
        Error::Lock {
            path: self.path.clone(),
            message,
        }
    }
}

impl Drop for SessionLock {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(err) = fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %err, "failed to remove session lock");
        }
    }
}

/// Read the metadata of an existing lock file
pub fn read_lock_meta(path: &Path) -> Result<LockMeta> {
    reject_symlink(path)?;
    let bytes = fs::read(path)?;
    serde_json::from_slice(&bytes).map_err(|e| Error::Lock {
        path: path.to_path_buf(),
        message: format!("corrupt metadata: {e}"),
    })
}

fn reject_symlink(path: &Path) -> Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => Err(Error::Lock {
            path: path.to_path_buf(),
            message: "lock path is a symlink".to_string(),
        }),
        _ => Ok(()),
    }
}
