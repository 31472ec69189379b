//! Repository validation: the only step allowed before anything is touched

use crate::error::Result;
use crate::repo::discover_repository;
use crate::sync::ProgressCallback;
use crate::types::{RepositoryHandle, SyncOptions};
use std::path::Path;
use tracing::info;

/// Confirm `path` is inside a work tree whose upstream remote is configured
pub async fn validate_repository(
    path: &Path,
    options: SyncOptions,
    progress: &dyn ProgressCallback,
) -> Result<RepositoryHandle> {
    let handle = discover_repository(path, options)?;
    info!(
        workdir = %handle.workdir.display(),
        branch = handle.branch_label(),
        upstream = %handle.options.upstream_name(),
        "repository validated"
    );
    progress
        .on_message(&format!(
            "Syncing {} with {}",
            handle.branch_label(),
            handle.options.upstream_name()
        ))
        .await;
    Ok(handle)
}
