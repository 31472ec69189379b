//! Commit synthesis
//!
//! Message shape:
//! `git-autosync: 2 file(s) added, 1 file(s) modified from <host>`

use crate::error::{Error, Result};
use crate::repo::GitEngine;
use crate::sync::ProgressCallback;
use crate::types::{ChangeCounts, CommitRecord};
use tracing::{debug, info};

/// Prefix of every synthesized commit message
pub const MESSAGE_PREFIX: &str = "git-autosync";

/// Render a commit message from change counts.
///
/// Zero-count categories are left out. If every count is zero the message
/// falls back to "changes detected".
pub fn format_commit_message(counts: &ChangeCounts, host: &str) -> String {
    let clauses: Vec<String> = [
        (counts.added, "added"),
        (counts.modified, "modified"),
        (counts.deleted, "deleted"),
    ]
    .into_iter()
    .filter(|(count, _)| *count > 0)
    .map(|(count, verb)| format!("{count} file(s) {verb}"))
    .collect();

    let summary = if clauses.is_empty() {
        "changes detected".to_string()
    } else {
        clauses.join(", ")
    };
    format!("{MESSAGE_PREFIX}: {summary} from {host}")
}

/// Commit whatever differs from HEAD. Returns `None` when nothing does.
pub async fn compose_commit(
    engine: &dyn GitEngine,
    progress: &dyn ProgressCallback,
) -> Result<Option<CommitRecord>> {
    if !engine.has_changes().await.map_err(commit_failure)? {
        debug!("nothing to commit");
        return Ok(None);
    }

    engine.stage_all().await.map_err(commit_failure)?;
    let changes = engine.staged_changes().await.map_err(commit_failure)?;
    let counts = ChangeCounts::from_changes(&changes);
    let host = engine.host_identifier().await;
    let message = format_commit_message(&counts, &host);

    let id = engine.commit(&message).await.map_err(commit_failure)?;
    info!(%id, %message, "created commit");
    progress.on_message(&format!("Committed: {message}")).await;

    Ok(Some(CommitRecord {
        id,
        message,
        counts,
    }))
}

fn commit_failure(err: Error) -> Error {
    Error::CommitFailure(err.to_string())
}
