//! Publishing local history to upstream

use crate::error::{Error, Result};
use crate::repo::GitEngine;
use crate::sync::{ProgressCallback, RemoteOp, RemoteStatus};
use crate::types::SyncOptions;
use tracing::info;

/// Outcome of the publish step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishOutcome {
    /// Commits HEAD was ahead of the upstream branch before pushing
    pub ahead: usize,
    /// Whether a push was issued
    pub pushed: bool,
}

/// Push HEAD to the upstream branch if it has anything upstream lacks.
///
/// A rejected push is fatal; nothing is retried or re-fetched.
pub async fn publish(
    engine: &dyn GitEngine,
    options: &SyncOptions,
    progress: &dyn ProgressCallback,
) -> Result<PublishOutcome> {
    let remote = options.remote.as_str();
    let ahead = engine
        .count_commits(&format!("{}..HEAD", options.upstream_ref()))
        .await?;

    if ahead == 0 {
        info!(upstream = %options.upstream_name(), "already in sync, nothing to push");
        progress
            .on_remote(RemoteOp::Push, remote, RemoteStatus::AlreadySynced)
            .await;
        return Ok(PublishOutcome {
            ahead,
            pushed: false,
        });
    }

    progress
        .on_remote(RemoteOp::Push, remote, RemoteStatus::Started)
        .await;
    let refspec = format!("HEAD:refs/heads/{}", options.branch);
    if let Err(err) = engine.push(remote, &refspec).await {
        let message = match err {
            Error::Git { stderr, .. } => stderr,
            other => other.to_string(),
        };
        progress
            .on_remote(RemoteOp::Push, remote, RemoteStatus::Failed(message.clone()))
            .await;
        return Err(Error::PublishFailure {
            remote: remote.to_string(),
            message,
        });
    }

    info!(ahead, %refspec, "published local history");
    progress
        .on_remote(RemoteOp::Push, remote, RemoteStatus::Success)
        .await;
    Ok(PublishOutcome {
        ahead,
        pushed: true,
    })
}
