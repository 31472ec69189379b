//! Scripted `GitEngine` for driving the session without a repository

#![allow(dead_code)]

use async_trait::async_trait;
use git_autosync::error::{Error, Result};
use git_autosync::repo::GitEngine;
use git_autosync::sync::{ProgressCallback, RemoteOp, RemoteStatus};
use git_autosync::types::{
    ApplyOutcome, ChangeKind, FileChange, RebaseOutcome, RepositoryHandle, SessionState,
    SyncOptions,
};
use std::path::PathBuf;
use std::sync::Mutex;

/// In-memory engine whose failures are chosen up front.
///
/// Every call is recorded by name so tests can assert which steps ran.
#[derive(Default)]
pub struct MockGitEngine {
    untracked: Mutex<Vec<String>>,
    modified: Mutex<Vec<String>>,
    stashed: Mutex<Option<Vec<String>>>,
    staged: Mutex<Vec<FileChange>>,
    ahead: Mutex<usize>,
    calls: Mutex<Vec<String>>,
    fail_snapshot: bool,
    sticky: Vec<String>,
    fail_fetch: bool,
    missing_upstream: bool,
    rebase_conflict: Option<Vec<String>>,
    apply_conflict: Option<Vec<String>>,
    fail_push: bool,
}

impl MockGitEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_untracked(self, paths: &[&str]) -> Self {
        *self.untracked.lock().unwrap() = paths.iter().map(ToString::to_string).collect();
        self
    }

    pub fn with_modified(self, paths: &[&str]) -> Self {
        *self.modified.lock().unwrap() = paths.iter().map(ToString::to_string).collect();
        self
    }

    /// Local commits upstream lacks before anything is committed
    pub fn with_ahead(self, ahead: usize) -> Self {
        *self.ahead.lock().unwrap() = ahead;
        self
    }

    /// Changes reported by `staged_changes`, instead of deriving them
    pub fn with_staged(self, changes: &[(ChangeKind, &str)]) -> Self {
        *self.staged.lock().unwrap() = changes
            .iter()
            .map(|(kind, path)| FileChange {
                kind: *kind,
                path: (*path).to_string(),
            })
            .collect();
        self
    }

    pub fn failing_snapshot(mut self) -> Self {
        self.fail_snapshot = true;
        self
    }

    /// Paths the snapshot cannot set aside, like a dirty submodule
    pub fn with_sticky(mut self, paths: &[&str]) -> Self {
        self.sticky = paths.iter().map(ToString::to_string).collect();
        self
    }

    pub fn failing_fetch(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    pub fn missing_upstream(mut self) -> Self {
        self.missing_upstream = true;
        self
    }

    pub fn conflicting_rebase(mut self, paths: &[&str]) -> Self {
        self.rebase_conflict = Some(paths.iter().map(ToString::to_string).collect());
        self
    }

    pub fn conflicting_apply(mut self, paths: &[&str]) -> Self {
        self.apply_conflict = Some(paths.iter().map(ToString::to_string).collect());
        self
    }

    pub fn failing_push(mut self) -> Self {
        self.fail_push = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called(&self, name: &str) -> bool {
        self.calls.lock().unwrap().iter().any(|c| c == name)
    }

    /// Paths currently pending in the simulated work tree
    pub fn pending(&self) -> Vec<String> {
        self.modified.lock().unwrap().clone()
    }

    pub fn has_stash(&self) -> bool {
        self.stashed.lock().unwrap().is_some()
    }

    fn record(&self, name: &str) {
        self.calls.lock().unwrap().push(name.to_string());
    }
}

fn git_error(command: &str, stderr: &str) -> Error {
    Error::Git {
        command: command.to_string(),
        stderr: stderr.to_string(),
    }
}

#[async_trait]
impl GitEngine for MockGitEngine {
    async fn untracked_paths(&self) -> Result<Vec<String>> {
        self.record("untracked_paths");
        Ok(self.untracked.lock().unwrap().clone())
    }

    async fn modified_paths(&self) -> Result<Vec<String>> {
        self.record("modified_paths");
        Ok(self.modified.lock().unwrap().clone())
    }

    async fn stage_paths(&self, paths: &[String]) -> Result<()> {
        self.record("stage_paths");
        let mut untracked = self.untracked.lock().unwrap();
        untracked.retain(|p| !paths.contains(p));
        self.modified.lock().unwrap().extend(paths.iter().cloned());
        Ok(())
    }

    async fn create_snapshot(&self, _label: &str) -> Result<Option<String>> {
        self.record("create_snapshot");
        if self.fail_snapshot {
            return Err(git_error("stash push", "cannot save the current index state"));
        }
        let mut modified = self.modified.lock().unwrap();
        let (left, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut *modified)
            .into_iter()
            .partition(|path| self.sticky.contains(path));
        *modified = left;
        drop(modified);
        if pending.is_empty() {
            return Ok(None);
        }
        *self.stashed.lock().unwrap() = Some(pending);
        Ok(Some("5ta5h".to_string()))
    }

    async fn apply_snapshot(&self, id: &str) -> Result<ApplyOutcome> {
        self.record("apply_snapshot");
        assert_eq!(id, "5ta5h");
        if let Some(paths) = &self.apply_conflict {
            // git keeps the stash entry when the pop conflicts
            return Ok(ApplyOutcome::Conflicted(paths.clone()));
        }
        let restored = self
            .stashed
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| git_error("stash pop", "no stash entries found"))?;
        self.modified.lock().unwrap().extend(restored);
        Ok(ApplyOutcome::Applied)
    }

    async fn fetch(&self, _remote: &str) -> Result<()> {
        self.record("fetch");
        if self.fail_fetch {
            return Err(git_error("fetch origin", "could not read from remote repository"));
        }
        Ok(())
    }

    async fn ref_exists(&self, _refname: &str) -> Result<bool> {
        self.record("ref_exists");
        Ok(!self.missing_upstream)
    }

    async fn rebase(&self, _onto: &str) -> Result<RebaseOutcome> {
        self.record("rebase");
        Ok(self
            .rebase_conflict
            .clone()
            .map_or(RebaseOutcome::Completed, RebaseOutcome::Conflicted))
    }

    async fn abort_rebase(&self) -> Result<()> {
        self.record("abort_rebase");
        Ok(())
    }

    async fn has_changes(&self) -> Result<bool> {
        self.record("has_changes");
        Ok(!self.modified.lock().unwrap().is_empty())
    }

    async fn stage_all(&self) -> Result<()> {
        self.record("stage_all");
        Ok(())
    }

    async fn staged_changes(&self) -> Result<Vec<FileChange>> {
        self.record("staged_changes");
        let staged = self.staged.lock().unwrap().clone();
        if !staged.is_empty() {
            return Ok(staged);
        }
        Ok(self
            .modified
            .lock()
            .unwrap()
            .iter()
            .map(|path| FileChange {
                kind: ChangeKind::Modified,
                path: path.clone(),
            })
            .collect())
    }

    async fn commit(&self, _message: &str) -> Result<String> {
        self.record("commit");
        self.modified.lock().unwrap().clear();
        *self.ahead.lock().unwrap() += 1;
        Ok("c0mm1t".to_string())
    }

    async fn count_commits(&self, _range: &str) -> Result<usize> {
        self.record("count_commits");
        Ok(*self.ahead.lock().unwrap())
    }

    async fn push(&self, _remote: &str, _refspec: &str) -> Result<()> {
        self.record("push");
        if self.fail_push {
            return Err(git_error(
                "push origin HEAD:refs/heads/master",
                "! [rejected] HEAD -> master (fetch first)",
            ));
        }
        *self.ahead.lock().unwrap() = 0;
        Ok(())
    }

    async fn host_identifier(&self) -> String {
        "test-host".to_string()
    }
}

/// Progress callback that records everything it is told
#[derive(Default)]
pub struct RecordingProgress {
    phases: Mutex<Vec<SessionState>>,
    remote: Mutex<Vec<(RemoteOp, RemoteStatus)>>,
    errors: Mutex<Vec<String>>,
}

impl RecordingProgress {
    pub fn phases(&self) -> Vec<SessionState> {
        self.phases.lock().unwrap().clone()
    }

    pub fn remote_events(&self) -> Vec<(RemoteOp, RemoteStatus)> {
        self.remote.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProgressCallback for RecordingProgress {
    async fn on_phase(&self, phase: SessionState) {
        self.phases.lock().unwrap().push(phase);
    }

    async fn on_remote(&self, op: RemoteOp, _remote: &str, status: RemoteStatus) {
        self.remote.lock().unwrap().push((op, status));
    }

    async fn on_error(&self, error: &Error) {
        self.errors.lock().unwrap().push(error.to_string());
    }

    async fn on_message(&self, _message: &str) {}
}

/// Handle for a repository that was never on disk
pub fn fake_handle() -> RepositoryHandle {
    RepositoryHandle {
        workdir: PathBuf::from("/nonexistent/work"),
        git_dir: PathBuf::from("/nonexistent/work/.git"),
        branch: Some("master".to_string()),
        options: SyncOptions::default(),
    }
}
