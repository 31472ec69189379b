//! Repository discovery

use crate::error::{Error, Result};
use crate::types::{RepositoryHandle, SyncOptions};
use std::path::Path;
use tracing::debug;

/// Find the repository containing `path` and confirm the upstream remote exists.
///
/// Read-only: nothing in the repository is touched.
pub fn discover_repository(path: &Path, options: SyncOptions) -> Result<RepositoryHandle> {
    let repo = gix::discover(path).map_err(|e| {
        debug!(path = %path.display(), error = %e, "repository discovery failed");
        Error::NotARepository(path.to_path_buf())
    })?;

    // Bare repositories have nothing to capture or reapply
    let workdir = repo
        .workdir()
        .ok_or_else(|| Error::NotARepository(path.to_path_buf()))?
        .to_path_buf();
    let git_dir = repo.git_dir().to_path_buf();

    let remotes: Vec<String> = repo
        .remote_names()
        .iter()
        .map(ToString::to_string)
        .collect();
    debug!(?remotes, "configured remotes");
    if !remotes.iter().any(|name| *name == options.remote) {
        return Err(Error::NoUpstreamRemote(options.remote));
    }

    let branch = repo
        .head_name()
        .ok()
        .flatten()
        .map(|name| name.shorten().to_string());

    debug!(
        workdir = %workdir.display(),
        git_dir = %git_dir.display(),
        branch = ?branch,
        "discovered repository"
    );

    Ok(RepositoryHandle {
        workdir,
        git_dir,
        branch,
        options,
    })
}
