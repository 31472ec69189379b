//! Repository synchronization
//!
//! One session runs these steps in order, aborting on the first failure:
//! 1. Validate - repository and upstream remote exist
//! 2. Capture - stage untracked files, set aside tracked edits
//! 3. Upstream - fetch and rebase onto the upstream branch
//! 4. Reintegrate - reapply the set-aside edits
//! 5. Compose - commit whatever now differs from HEAD
//! 6. Publish - push to the upstream branch

mod capture;
mod compose;
mod progress;
mod publish;
mod reintegrate;
mod session;
mod upstream;
mod validate;

pub use capture::{adopt_untracked, capture_changes, observe_working_copy};
pub use compose::{MESSAGE_PREFIX, compose_commit, format_commit_message};
pub use progress::{NoopProgress, ProgressCallback, RemoteOp, RemoteStatus};
pub use publish::{PublishOutcome, publish};
pub use reintegrate::{reintegrate_changes, restore_snapshot};
pub use session::SyncSession;
pub use upstream::sync_upstream;
pub use validate::validate_repository;

use crate::error::Result;
use crate::lock::SessionLock;
use crate::repo::GitCli;
use crate::types::{SessionState, SyncOptions, SyncReport};
use std::path::Path;
use tracing::warn;

/// Synchronize the repository containing `path` with its upstream.
///
/// Holds the repository's session lock for the whole run.
pub async fn sync_repository(
    path: &Path,
    options: SyncOptions,
    progress: &dyn ProgressCallback,
) -> Result<SyncReport> {
    progress.on_phase(SessionState::Start).await;

    let prepared = validate_repository(path, options, progress)
        .await
        .and_then(|handle| SessionLock::acquire(&handle.git_dir).map(|lock| (handle, lock)));
    let (handle, lock) = match prepared {
        Ok(prepared) => prepared,
        Err(err) => {
            progress.on_phase(SessionState::Failed).await;
            return Err(err);
        }
    };
    progress.on_phase(SessionState::Validated).await;

    let engine = GitCli::new(handle.workdir());
    let result = SyncSession::new(handle, &engine, progress).run().await;

    if let Err(err) = lock.release() {
        warn!(error = %err, "failed to release session lock");
    }
    result
}
