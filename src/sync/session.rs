//! Session controller
//!
//! Sequences capture, upstream sync, reintegration, commit and publish,
//! stopping at the first failure. The session owns the optional snapshot and
//! hands it to exactly one consumer: reintegration on the happy path, or the
//! rollback when upstream sync fails.

use crate::error::{Error, Result};
use crate::repo::GitEngine;
use crate::sync::{
    ProgressCallback, capture_changes, compose_commit, publish, reintegrate_changes,
    restore_snapshot, sync_upstream,
};
use crate::types::{ChangeCounts, ChangeSnapshot, RepositoryHandle, SessionState, SyncReport};
use tracing::{debug, info, warn};

/// Run-scoped context of one sync
pub struct SyncSession<'a> {
    handle: RepositoryHandle,
    engine: &'a dyn GitEngine,
    progress: &'a dyn ProgressCallback,
    state: SessionState,
    snapshot: Option<ChangeSnapshot>,
    counts: ChangeCounts,
    message: Option<String>,
}

impl<'a> SyncSession<'a> {
    /// Start a session on a validated repository
    pub fn new(
        handle: RepositoryHandle,
        engine: &'a dyn GitEngine,
        progress: &'a dyn ProgressCallback,
    ) -> Self {
        Self {
            handle,
            engine,
            progress,
            state: SessionState::Validated,
            snapshot: None,
            counts: ChangeCounts::default(),
            message: None,
        }
    }

    /// Run every step to completion. Consumes the session: there is no way
    /// back to the start within one invocation.
    pub async fn run(mut self) -> Result<SyncReport> {
        match self.drive().await {
            Ok(report) => {
                self.advance(SessionState::Done).await;
                Ok(report)
            }
            Err(err) => {
                warn!(state = ?self.state, kind = %err.kind(), error = %err, "sync failed");
                self.advance(SessionState::Failed).await;
                Err(err)
            }
        }
    }

    async fn drive(&mut self) -> Result<SyncReport> {
        self.snapshot = capture_changes(self.engine, self.progress).await?;
        let captured = self.snapshot.is_some();
        self.advance(SessionState::Captured).await;

        if let Err(err) = sync_upstream(self.engine, &self.handle.options, self.progress).await {
            self.rollback(&err).await;
            return Err(err);
        }
        self.advance(SessionState::Synced).await;

        reintegrate_changes(self.engine, self.snapshot.take(), self.progress).await?;
        self.advance(SessionState::Reintegrated).await;

        let commit = compose_commit(self.engine, self.progress).await?;
        if let Some(record) = &commit {
            self.counts = record.counts;
            self.message = Some(record.message.clone());
            self.advance(SessionState::Committed).await;
        }

        let published = publish(self.engine, &self.handle.options, self.progress).await?;
        self.advance(SessionState::Published).await;

        debug!(counts = ?self.counts, message = ?self.message, "session summary");
        Ok(SyncReport {
            branch: self.handle.branch.clone(),
            captured,
            commit,
            ahead: published.ahead,
            pushed: published.pushed,
        })
    }

    /// Give the snapshot back to the untouched work tree
    async fn rollback(&mut self, cause: &Error) {
        if let Some(snapshot) = self.snapshot.take() {
            info!(kind = %cause.kind(), label = %snapshot.label, "restoring local changes");
            restore_snapshot(self.engine, snapshot, self.progress).await;
        }
    }

    async fn advance(&mut self, next: SessionState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "invalid transition {:?} -> {:?}",
            self.state,
            next
        );
        info!(from = ?self.state, to = ?next, "session state");
        self.state = next;
        self.progress.on_phase(next).await;
    }
}
