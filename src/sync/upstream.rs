//! Upstream integration: fetch, then linearize local history onto upstream

use crate::error::{Error, Result};
use crate::repo::GitEngine;
use crate::sync::{ProgressCallback, RemoteOp, RemoteStatus};
use crate::types::{RebaseOutcome, SyncOptions};
use tracing::{info, warn};

/// Fetch upstream and rebase HEAD onto the upstream branch.
///
/// A conflicting rebase is aborted before the error is returned, so local
/// history is exactly what it was before the call.
pub async fn sync_upstream(
    engine: &dyn GitEngine,
    options: &SyncOptions,
    progress: &dyn ProgressCallback,
) -> Result<()> {
    fetch_upstream(engine, options, progress).await?;

    let upstream = options.upstream_ref();
    if !engine.ref_exists(&upstream).await? {
        return Err(Error::NoUpstreamBranch {
            remote: options.remote.clone(),
            branch: options.branch.clone(),
        });
    }

    match engine.rebase(&upstream).await? {
        RebaseOutcome::Completed => {
            info!(%upstream, "history linearized onto upstream");
            Ok(())
        }
        RebaseOutcome::Conflicted(paths) => {
            warn!(%upstream, ?paths, "rebase conflicted, aborting");
            if let Err(err) = engine.abort_rebase().await {
                warn!(error = %err, "failed to abort rebase");
                progress.on_error(&err).await;
            }
            Err(Error::RebaseConflict {
                upstream: options.upstream_name(),
                paths,
            })
        }
    }
}

async fn fetch_upstream(
    engine: &dyn GitEngine,
    options: &SyncOptions,
    progress: &dyn ProgressCallback,
) -> Result<()> {
    let remote = options.remote.as_str();
    progress
        .on_remote(RemoteOp::Fetch, remote, RemoteStatus::Started)
        .await;
    match engine.fetch(remote).await {
        Ok(()) => {
            progress
                .on_remote(RemoteOp::Fetch, remote, RemoteStatus::Success)
                .await;
            Ok(())
        }
        Err(err) => {
            let message = match err {
                Error::Git { stderr, .. } => stderr,
                other => other.to_string(),
            };
            progress
                .on_remote(
                    RemoteOp::Fetch,
                    remote,
                    RemoteStatus::Failed(message.clone()),
                )
                .await;
            Err(Error::FetchFailure {
                remote: remote.to_string(),
                message,
            })
        }
    }
}
