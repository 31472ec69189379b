//! Error types for git-autosync
//!
//! Every variant ends the session: there are no retries and no recoverable
//! kinds. The variant tells the caller which step failed and what state the
//! repository was left in.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can end a sync session
#[derive(Debug, Error)]
pub enum Error {
    /// No repository metadata found from the path upward
    #[error("not a git repository (or any parent up to mount point): {}", .0.display())]
    NotARepository(PathBuf),

    /// The upstream remote is not configured
    #[error("no remote named '{0}' is configured")]
    NoUpstreamRemote(String),

    /// The upstream branch does not exist on the remote after fetching
    #[error("upstream branch '{remote}/{branch}' does not exist")]
    NoUpstreamBranch {
        /// Remote name
        remote: String,
        /// Branch name on the remote
        branch: String,
    },

    /// Another session holds the repository lock
    #[error("another git-autosync session holds {} ({holder}); remove the file if that session is gone", .path.display())]
    SessionLocked {
        /// Lock file path
        path: PathBuf,
        /// Description of the holder, from the lock metadata
        holder: String,
    },

    /// Staging untracked files or snapshotting tracked changes failed
    #[error("failed to capture local changes: {0}")]
    CaptureFailure(String),

    /// Fetching from the upstream remote failed
    #[error("failed to fetch from '{remote}': {message}")]
    FetchFailure {
        /// Remote name
        remote: String,
        /// Engine output
        message: String,
    },

    /// Replaying local commits onto upstream hit a conflict.
    ///
    /// The replay has been aborted: local history is exactly as it was.
    #[error("rebase onto '{upstream}' conflicted in {}; local history was restored", format_paths(.paths))]
    RebaseConflict {
        /// Upstream ref the rebase targeted
        upstream: String,
        /// Paths reported as conflicted
        paths: Vec<String>,
    },

    /// Reapplying the captured changes conflicted.
    ///
    /// This is NOT reverted. The working copy holds conflict markers and the
    /// snapshot stays in the stash list under `label` until resolved by hand.
    #[error("reapplying local changes conflicted in {}; resolve by hand (snapshot kept as '{label}')", format_paths(.paths))]
    ReintegrationConflict {
        /// Snapshot label
        label: String,
        /// Paths reported as conflicted
        paths: Vec<String>,
    },

    /// The synthesized commit could not be created
    #[error("failed to commit changes: {0}")]
    CommitFailure(String),

    /// The remote rejected the push
    #[error("failed to push to '{remote}': {message}")]
    PublishFailure {
        /// Remote name
        remote: String,
        /// Engine output
        message: String,
    },

    /// A git command failed outside the classified steps
    #[error("git {command} failed: {stderr}")]
    Git {
        /// Arguments passed to git
        command: String,
        /// Captured stderr, trimmed
        stderr: String,
    },

    /// Lock file metadata could not be read or written
    #[error("lock file error at {}: {message}", .path.display())]
    Lock {
        /// Lock file path
        path: PathBuf,
        /// What went wrong
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Stable name of an [`Error`] variant, used in failure reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// See [`Error::NotARepository`]
    NotARepository,
    /// See [`Error::NoUpstreamRemote`]
    NoUpstreamRemote,
    /// See [`Error::NoUpstreamBranch`]
    NoUpstreamBranch,
    /// See [`Error::SessionLocked`]
    SessionLocked,
    /// See [`Error::CaptureFailure`]
    CaptureFailure,
    /// See [`Error::FetchFailure`]
    FetchFailure,
    /// See [`Error::RebaseConflict`]
    RebaseConflict,
    /// See [`Error::ReintegrationConflict`]
    ReintegrationConflict,
    /// See [`Error::CommitFailure`]
    CommitFailure,
    /// See [`Error::PublishFailure`]
    PublishFailure,
    /// See [`Error::Git`]
    Git,
    /// See [`Error::Lock`]
    Lock,
    /// See [`Error::Io`]
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotARepository => "NotARepository",
            Self::NoUpstreamRemote => "NoUpstreamRemote",
            Self::NoUpstreamBranch => "NoUpstreamBranch",
            Self::SessionLocked => "SessionLocked",
            Self::CaptureFailure => "CaptureFailure",
            Self::FetchFailure => "FetchFailure",
            Self::RebaseConflict => "RebaseConflict",
            Self::ReintegrationConflict => "ReintegrationConflict",
            Self::CommitFailure => "CommitFailure",
            Self::PublishFailure => "PublishFailure",
            Self::Git => "GitError",
            Self::Lock => "LockError",
            Self::Io => "IoError",
        };
        f.write_str(name)
    }
}

impl Error {
    /// The kind of this error
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotARepository(_) => ErrorKind::NotARepository,
            Self::NoUpstreamRemote(_) => ErrorKind::NoUpstreamRemote,
            Self::NoUpstreamBranch { .. } => ErrorKind::NoUpstreamBranch,
            Self::SessionLocked { .. } => ErrorKind::SessionLocked,
            Self::CaptureFailure(_) => ErrorKind::CaptureFailure,
            Self::FetchFailure { .. } => ErrorKind::FetchFailure,
            Self::RebaseConflict { .. } => ErrorKind::RebaseConflict,
            Self::ReintegrationConflict { .. } => ErrorKind::ReintegrationConflict,
            Self::CommitFailure(_) => ErrorKind::CommitFailure,
            Self::PublishFailure { .. } => ErrorKind::PublishFailure,
            Self::Git { .. } => ErrorKind::Git,
            Self::Lock { .. } => ErrorKind::Lock,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    /// Whether the repository may have been left in a state needing manual
    /// attention
    pub const fn needs_manual_resolution(&self) -> bool {
        matches!(self, Self::ReintegrationConflict { .. })
    }
}

fn format_paths(paths: &[String]) -> String {
    if paths.is_empty() {
        "unknown paths".to_string()
    } else {
        paths.join(", ")
    }
}
