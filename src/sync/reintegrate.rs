//! Reapplying captured changes on top of the new history

use crate::error::{Error, Result};
use crate::repo::GitEngine;
use crate::sync::ProgressCallback;
use crate::types::{ApplyOutcome, ChangeSnapshot};
use tracing::{debug, info, warn};

/// Reapply the snapshot, if any. Returns whether one was applied.
///
/// The snapshot is consumed whatever the outcome. A conflict is not rolled
/// back: the work tree keeps the conflict markers and git keeps the stash
/// entry, so the edits can still be recovered by hand.
pub async fn reintegrate_changes(
    engine: &dyn GitEngine,
    snapshot: Option<ChangeSnapshot>,
    progress: &dyn ProgressCallback,
) -> Result<bool> {
    let Some(snapshot) = snapshot else {
        debug!("no snapshot to reapply");
        return Ok(false);
    };

    match engine.apply_snapshot(&snapshot.id).await? {
        ApplyOutcome::Applied => {
            info!(label = %snapshot.label, "reapplied local changes");
            progress.on_message("Reapplied local changes").await;
            Ok(true)
        }
        ApplyOutcome::Conflicted(paths) => {
            warn!(label = %snapshot.label, ?paths, "reapplying local changes conflicted");
            Err(Error::ReintegrationConflict {
                label: snapshot.label,
                paths,
            })
        }
    }
}

/// Put a snapshot back after a failed upstream sync.
///
/// HEAD has not moved at this point, so this normally applies cleanly.
/// Failure is reported but never replaces the error that caused the
/// rollback.
pub async fn restore_snapshot(
    engine: &dyn GitEngine,
    snapshot: ChangeSnapshot,
    progress: &dyn ProgressCallback,
) {
    match engine.apply_snapshot(&snapshot.id).await {
        Ok(ApplyOutcome::Applied) => {
            info!(label = %snapshot.label, "restored local changes after failure");
            progress.on_message("Restored local changes").await;
        }
        Ok(ApplyOutcome::Conflicted(paths)) => {
            warn!(label = %snapshot.label, ?paths, "restoring local changes conflicted");
            progress
                .on_error(&Error::ReintegrationConflict {
                    label: snapshot.label,
                    paths,
                })
                .await;
        }
        Err(err) => {
            warn!(label = %snapshot.label, error = %err, "failed to restore local changes");
            progress.on_error(&err).await;
            progress
                .on_message(&format!(
                    "Local changes are kept in the stash as '{}'",
                    snapshot.label
                ))
                .await;
        }
    }
}
