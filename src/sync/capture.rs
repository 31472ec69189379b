//! Change capture
//!
//! Untracked files are always adopted: they are staged, never ignored beyond
//! what git's own ignore rules already exclude. Everything that then differs
//! from HEAD is set aside in a snapshot so the work tree is clean for the
//! rebase.

use crate::error::{Error, Result};
use crate::repo::GitEngine;
use crate::sync::ProgressCallback;
use crate::types::{ApplyOutcome, ChangeSnapshot, WorkingCopyState};
use chrono::Utc;
use tracing::{debug, info, warn};

/// Observe pending edits without changing anything
pub async fn observe_working_copy(engine: &dyn GitEngine) -> Result<WorkingCopyState> {
    let untracked = engine.untracked_paths().await.map_err(capture_failure)?;
    let modified = engine.modified_paths().await.map_err(capture_failure)?;
    Ok(WorkingCopyState {
        untracked,
        modified,
    })
}

/// Stage every untracked path, moving it into the tracked set
pub async fn adopt_untracked(engine: &dyn GitEngine, state: &mut WorkingCopyState) -> Result<()> {
    if state.untracked.is_empty() {
        return Ok(());
    }
    engine
        .stage_paths(&state.untracked)
        .await
        .map_err(capture_failure)?;
    debug!(count = state.untracked.len(), "staged untracked paths");
    state.modified.append(&mut state.untracked);
    Ok(())
}

/// Capture pending edits, leaving a clean work tree.
///
/// Returns `None` when there was nothing to set aside.
pub async fn capture_changes(
    engine: &dyn GitEngine,
    progress: &dyn ProgressCallback,
) -> Result<Option<ChangeSnapshot>> {
    let mut state = observe_working_copy(engine).await?;
    let adopted = state.untracked.len();
    let edited = state.modified.len();
    adopt_untracked(engine, &mut state).await?;

    if state.is_clean() {
        debug!("working copy clean, nothing to capture");
        return Ok(None);
    }

    let created_at = Utc::now();
    let label = ChangeSnapshot::label_for(created_at);
    let id = engine
        .create_snapshot(&label)
        .await
        .map_err(capture_failure)?
        .ok_or_else(|| {
            Error::CaptureFailure(format!(
                "{} changed path(s) were found but nothing was set aside",
                state.modified.len()
            ))
        })?;

    let leftover = engine.modified_paths().await.map_err(capture_failure)?;
    if !leftover.is_empty() {
        return Err(undo_partial_capture(engine, &id, &label, &leftover).await);
    }

    info!(%id, %label, adopted, edited, "captured local changes");
    progress
        .on_message(&format!(
            "Set aside {edited} changed and {adopted} new path(s)"
        ))
        .await;

    Ok(Some(ChangeSnapshot {
        id,
        label,
        created_at,
    }))
}

/// Put a snapshot that left paths behind back into the work tree.
///
/// A failed capture must not remove anything, so the edits are reapplied
/// before the failure is reported.
async fn undo_partial_capture(
    engine: &dyn GitEngine,
    id: &str,
    label: &str,
    leftover: &[String],
) -> Error {
    let remaining = leftover.join(", ");
    let restored = match engine.apply_snapshot(id).await {
        Ok(ApplyOutcome::Applied) => "edits restored".to_string(),
        Ok(ApplyOutcome::Conflicted(paths)) => format!(
            "restoring '{label}' conflicted on {}, it is still in the stash list",
            paths.join(", ")
        ),
        Err(err) => format!("restoring '{label}' failed ({err}), it is still in the stash list"),
    };
    warn!(%label, %remaining, %restored, "snapshot left paths behind");
    Error::CaptureFailure(format!(
        "working copy still has changes after snapshot: {remaining}; {restored}"
    ))
}

fn capture_failure(err: Error) -> Error {
    match err {
        Error::CaptureFailure(_) => err,
        other => Error::CaptureFailure(other.to_string()),
    }
}
