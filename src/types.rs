//! Core types for git-autosync

use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;
use std::path::{Path, PathBuf};

/// Default upstream remote name
pub const DEFAULT_REMOTE: &str = "origin";

/// Default upstream branch name
pub const DEFAULT_BRANCH: &str = "master";

/// Options for a sync session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Remote to fetch from and publish to
    pub remote: String,
    /// Branch on the remote to linearize onto and publish to
    pub branch: String,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            remote: DEFAULT_REMOTE.to_string(),
            branch: DEFAULT_BRANCH.to_string(),
        }
    }
}

impl SyncOptions {
    /// Remote-tracking ref for the upstream branch, e.g. `refs/remotes/origin/master`
    pub fn upstream_ref(&self) -> String {
        format!("refs/remotes/{}/{}", self.remote, self.branch)
    }

    /// Short upstream name, e.g. `origin/master`
    pub fn upstream_name(&self) -> String {
        format!("{}/{}", self.remote, self.branch)
    }
}

/// A validated repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryHandle {
    /// Root of the work tree
    pub workdir: PathBuf,
    /// Git metadata directory
    pub git_dir: PathBuf,
    /// Current branch, `None` when HEAD is detached
    pub branch: Option<String>,
    /// Upstream configuration the handle was validated against
    pub options: SyncOptions,
}

impl RepositoryHandle {
    /// Work tree root
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Branch name for display
    pub fn branch_label(&self) -> &str {
        self.branch.as_deref().unwrap_or("(detached HEAD)")
    }
}

/// Pending edits observed at one instant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkingCopyState {
    /// Paths present on disk but never recorded
    pub untracked: Vec<String>,
    /// Recorded paths whose content differs from HEAD
    pub modified: Vec<String>,
}

impl WorkingCopyState {
    /// True when there is nothing pending at all
    pub fn is_clean(&self) -> bool {
        self.untracked.is_empty() && self.modified.is_empty()
    }
}

/// Captured tracked changes, set aside while upstream is integrated.
///
/// Deliberately not `Clone`: reintegration takes it by value, so it can only
/// be applied once.
#[derive(Debug, PartialEq, Eq)]
pub struct ChangeSnapshot {
    /// Engine identifier of the snapshot (stash commit id)
    pub id: String,
    /// Human-readable label recorded with the snapshot
    pub label: String,
    /// When the snapshot was taken
    pub created_at: DateTime<Utc>,
}

impl ChangeSnapshot {
    /// Label used for a snapshot taken at `created_at`
    pub fn label_for(created_at: DateTime<Utc>) -> String {
        format!(
            "git-autosync snapshot {}",
            created_at.to_rfc3339_opts(SecondsFormat::Secs, true)
        )
    }
}

/// Kind of change to a single path, relative to HEAD
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// New path
    Added,
    /// Content or mode changed
    Modified,
    /// Path removed
    Deleted,
}

/// A staged change to one path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    /// Kind of change
    pub kind: ChangeKind,
    /// Path relative to the work tree root
    pub path: String,
}

/// Added / modified / deleted counts for a commit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeCounts {
    /// Files added
    pub added: usize,
    /// Files modified
    pub modified: usize,
    /// Files deleted
    pub deleted: usize,
}

impl ChangeCounts {
    /// Tally a list of changes
    pub fn from_changes(changes: &[FileChange]) -> Self {
        changes.iter().fold(Self::default(), |mut counts, change| {
            match change.kind {
                ChangeKind::Added => counts.added += 1,
                ChangeKind::Modified => counts.modified += 1,
                ChangeKind::Deleted => counts.deleted += 1,
            }
            counts
        })
    }

    /// Total number of changed files
    pub const fn total(&self) -> usize {
        self.added + self.modified + self.deleted
    }
}

/// The commit synthesized by a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    /// Commit id
    pub id: String,
    /// Full commit message
    pub message: String,
    /// Counts the message was rendered from
    pub counts: ChangeCounts,
}

/// Result of reapplying a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Snapshot applied and dropped
    Applied,
    /// Application stopped with conflicts; paths are the unmerged entries
    Conflicted(Vec<String>),
}

/// Result of replaying local history onto upstream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RebaseOutcome {
    /// History is now linear on top of upstream
    Completed,
    /// Replay stopped with conflicts and is still in progress
    Conflicted(Vec<String>),
}

/// Result of a successful session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Current branch at the start of the session
    pub branch: Option<String>,
    /// Whether local edits were captured and reapplied
    pub captured: bool,
    /// The synthesized commit, if any
    pub commit: Option<CommitRecord>,
    /// Commits local history was ahead of upstream before publishing
    pub ahead: usize,
    /// Whether anything was pushed
    pub pushed: bool,
}

impl SyncReport {
    /// True when the run changed nothing locally or remotely
    pub const fn already_in_sync(&self) -> bool {
        self.commit.is_none() && self.ahead == 0
    }
}

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Session created, nothing checked yet
    Start,
    /// Repository and remote confirmed
    Validated,
    /// Local edits staged or set aside
    Captured,
    /// History linearized onto upstream
    Synced,
    /// Captured edits reapplied
    Reintegrated,
    /// Summary commit created
    Committed,
    /// Local history published upstream
    Published,
    /// Session finished successfully
    Done,
    /// Session aborted
    Failed,
}

impl SessionState {
    /// Whether no further transition is possible
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Whether moving from `self` to `next` is allowed
    pub const fn can_advance_to(self, next: Self) -> bool {
        use SessionState::{
            Captured, Committed, Done, Failed, Published, Reintegrated, Start, Synced, Validated,
        };
        matches!(
            (self, next),
            (Start, Validated)
                | (Validated, Captured)
                | (Captured, Synced)
                | (Synced, Reintegrated)
                | (Reintegrated, Committed | Published)
                | (Committed, Published)
                | (Published, Done)
        ) || (!self.is_terminal() && matches!(next, Failed))
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "Starting"),
            Self::Validated => write!(f, "Validated repository"),
            Self::Captured => write!(f, "Captured local changes"),
            Self::Synced => write!(f, "Synced with upstream"),
            Self::Reintegrated => write!(f, "Reapplied local changes"),
            Self::Committed => write!(f, "Committed"),
            Self::Published => write!(f, "Published"),
            Self::Done => write!(f, "Done"),
            Self::Failed => write!(f, "Failed"),
        }
    }
}
