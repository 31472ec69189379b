//! Repository access
//!
//! Discovery is read-only and goes through `gix`. Everything that mutates the
//! repository goes through a [`GitEngine`], so the session can be driven
//! against a scripted engine in tests.

mod discover;
mod git_cli;

pub use discover::discover_repository;
pub use git_cli::{GitCli, parse_name_status, parse_status_paths};

use crate::error::Result;
use crate::types::{ApplyOutcome, FileChange, RebaseOutcome};
use async_trait::async_trait;

/// Version-control operations the sync session orchestrates
///
/// Every method runs to completion before returning; there is no
/// cancellation and no retry at this layer.
#[async_trait]
pub trait GitEngine: Send + Sync {
    /// Paths present in the work tree but never recorded (ignore rules apply)
    async fn untracked_paths(&self) -> Result<Vec<String>>;

    /// Recorded paths whose index or work tree content differs from HEAD.
    ///
    /// Edits inside a submodule's own work tree are not reported; a snapshot
    /// cannot set them aside.
    async fn modified_paths(&self) -> Result<Vec<String>>;

    /// Add the given paths to the index
    async fn stage_paths(&self, paths: &[String]) -> Result<()>;

    /// Set aside all tracked changes under `label`, leaving a clean work tree.
    ///
    /// Returns the snapshot id, or `None` if there was nothing to set aside.
    async fn create_snapshot(&self, label: &str) -> Result<Option<String>>;

    /// Reapply and drop the snapshot with the given id
    async fn apply_snapshot(&self, id: &str) -> Result<ApplyOutcome>;

    /// Fetch from a remote
    async fn fetch(&self, remote: &str) -> Result<()>;

    /// Whether a fully-qualified ref exists
    async fn ref_exists(&self, refname: &str) -> Result<bool>;

    /// Replay HEAD's commits on top of `onto`
    async fn rebase(&self, onto: &str) -> Result<RebaseOutcome>;

    /// Abandon an in-progress rebase, restoring the pre-rebase state
    async fn abort_rebase(&self) -> Result<()>;

    /// Whether the work tree or index (tracked or untracked) differs from HEAD,
    /// ignoring edits inside submodules
    async fn has_changes(&self) -> Result<bool>;

    /// Stage every difference, including deletions and new files
    async fn stage_all(&self) -> Result<()>;

    /// Staged changes relative to HEAD
    async fn staged_changes(&self) -> Result<Vec<FileChange>>;

    /// Commit the index, returning the new commit id
    async fn commit(&self, message: &str) -> Result<String>;

    /// Number of commits in a revision range such as `origin/master..HEAD`
    async fn count_commits(&self, range: &str) -> Result<usize>;

    /// Push a refspec to a remote
    async fn push(&self, remote: &str, refspec: &str) -> Result<()>;

    /// Identifier of the local host, used in commit messages
    async fn host_identifier(&self) -> String;
}
