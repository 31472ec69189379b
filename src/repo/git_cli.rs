//! `GitEngine` backed by the `git` executable

use crate::error::{Error, Result};
use crate::repo::GitEngine;
use crate::types::{ApplyOutcome, ChangeKind, FileChange, RebaseOutcome};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Output;
use tokio::process::Command;
use tracing::{debug, trace};

/// Host identifier used when the host name cannot be read
const FALLBACK_HOST: &str = "localhost";

/// Drives `git` as a child process rooted at a work tree
#[derive(Debug, Clone)]
pub struct GitCli {
    workdir: PathBuf,
}

impl GitCli {
    /// Create an engine for the work tree at `workdir`
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    /// Work tree this engine operates on
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Run git, returning the raw output whatever the exit status
    async fn run(&self, args: &[&str]) -> Result<Output> {
        debug!(args = ?args, "running git");
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.workdir)
            // never block an unattended run on a credential prompt
            .env("GIT_TERMINAL_PROMPT", "0")
            .output()
            .await
            .map_err(|e| Error::Git {
                command: args.join(" "),
                stderr: format!("failed to run git: {e}"),
            })?;
        trace!(
            status = ?output.status,
            stdout = %String::from_utf8_lossy(&output.stdout),
            stderr = %String::from_utf8_lossy(&output.stderr),
            "git finished"
        );
        Ok(output)
    }

    /// Run git and fail unless it exits successfully, returning stdout
    async fn run_ok(&self, args: &[&str]) -> Result<String> {
        let output = self.run(args).await?;
        if !output.status.success() {
            return Err(command_error(args, &output));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn unmerged_paths(&self) -> Result<Vec<String>> {
        let stdout = self
            .run_ok(&["diff", "--name-only", "--diff-filter=U", "-z"])
            .await?;
        Ok(split_nul(&stdout))
    }

    async fn resolve(&self, rev: &str) -> Result<Option<String>> {
        let output = self.run(&["rev-parse", "--quiet", "--verify", rev]).await?;
        if !output.status.success() {
            return Ok(None);
        }
        let oid = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok((!oid.is_empty()).then_some(oid))
    }

    /// `stash@{n}` name of the stash entry with commit id `id`
    async fn stash_entry(&self, id: &str) -> Result<Option<String>> {
        let stdout = self.run_ok(&["stash", "list", "--format=%H"]).await?;
        Ok(stdout
            .lines()
            .position(|line| line.trim() == id)
            .map(|index| format!("stash@{{{index}}}")))
    }
}

#[async_trait]
impl GitEngine for GitCli {
    async fn untracked_paths(&self) -> Result<Vec<String>> {
        let stdout = self
            .run_ok(&["ls-files", "--others", "--exclude-standard", "-z"])
            .await?;
        Ok(split_nul(&stdout))
    }

    async fn modified_paths(&self) -> Result<Vec<String>> {
        let stdout = self
            .run_ok(&[
                "status",
                "--porcelain=v1",
                "-z",
                "--untracked-files=no",
                "--ignore-submodules=dirty",
            ])
            .await?;
        Ok(parse_status_paths(&stdout))
    }

    async fn stage_paths(&self, paths: &[String]) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }
        let mut args = vec!["add", "--"];
        args.extend(paths.iter().map(String::as_str));
        self.run_ok(&args).await?;
        Ok(())
    }

    async fn create_snapshot(&self, label: &str) -> Result<Option<String>> {
        let before = self.resolve("refs/stash").await?;
        self.run_ok(&["stash", "push", "--quiet", "--message", label])
            .await?;
        let after = self.resolve("refs/stash").await?;
        if after.is_none() || after == before {
            debug!("nothing was stashed");
            return Ok(None);
        }
        Ok(after)
    }

    async fn apply_snapshot(&self, id: &str) -> Result<ApplyOutcome> {
        let entry = self.stash_entry(id).await?.ok_or_else(|| Error::Git {
            command: "stash pop".to_string(),
            stderr: format!("snapshot {id} is no longer in the stash list"),
        })?;
        let output = self.run(&["stash", "pop", "--quiet", &entry]).await?;
        if output.status.success() {
            return Ok(ApplyOutcome::Applied);
        }
        let paths = self.unmerged_paths().await?;
        debug!(
            stderr = %String::from_utf8_lossy(&output.stderr).trim(),
            ?paths,
            "stash pop failed"
        );
        Ok(ApplyOutcome::Conflicted(paths))
    }

    async fn fetch(&self, remote: &str) -> Result<()> {
        self.run_ok(&["fetch", "--quiet", remote]).await?;
        Ok(())
    }

    async fn ref_exists(&self, refname: &str) -> Result<bool> {
        Ok(self.resolve(refname).await?.is_some())
    }

    async fn rebase(&self, onto: &str) -> Result<RebaseOutcome> {
        let output = self.run(&["rebase", "--quiet", onto]).await?;
        if output.status.success() {
            return Ok(RebaseOutcome::Completed);
        }
        let paths = self.unmerged_paths().await.unwrap_or_default();
        debug!(
            stderr = %String::from_utf8_lossy(&output.stderr).trim(),
            ?paths,
            "rebase stopped"
        );
        Ok(RebaseOutcome::Conflicted(paths))
    }

    async fn abort_rebase(&self) -> Result<()> {
        self.run_ok(&["rebase", "--abort"]).await?;
        Ok(())
    }

    async fn has_changes(&self) -> Result<bool> {
        let stdout = self
            .run_ok(&["status", "--porcelain=v1", "-z", "--ignore-submodules=dirty"])
            .await?;
        Ok(!stdout.is_empty())
    }

    async fn stage_all(&self) -> Result<()> {
        self.run_ok(&["add", "--all"]).await?;
        Ok(())
    }

    async fn staged_changes(&self) -> Result<Vec<FileChange>> {
        let stdout = self
            .run_ok(&["diff", "--cached", "--name-status", "--no-renames", "-z", "HEAD"])
            .await?;
        Ok(parse_name_status(&stdout))
    }

    async fn commit(&self, message: &str) -> Result<String> {
        self.run_ok(&["commit", "--quiet", "--message", message])
            .await?;
        self.resolve("HEAD").await?.ok_or_else(|| Error::Git {
            command: "rev-parse HEAD".to_string(),
            stderr: "HEAD does not resolve after commit".to_string(),
        })
    }

    async fn count_commits(&self, range: &str) -> Result<usize> {
        let stdout = self.run_ok(&["rev-list", "--count", range]).await?;
        stdout.trim().parse().map_err(|e| Error::Git {
            command: format!("rev-list --count {range}"),
            stderr: format!("unexpected output {:?}: {e}", stdout.trim()),
        })
    }

    async fn push(&self, remote: &str, refspec: &str) -> Result<()> {
        self.run_ok(&["push", "--quiet", remote, refspec]).await?;
        Ok(())
    }

    async fn host_identifier(&self) -> String {
        whoami::fallible::hostname()
            .ok()
            .map(|host| host.trim().to_string())
            .filter(|host| !host.is_empty())
            .unwrap_or_else(|| FALLBACK_HOST.to_string())
    }
}

fn command_error(args: &[&str], output: &Output) -> Error {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let stderr = if stderr.is_empty() {
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    } else {
        stderr
    };
    Error::Git {
        command: args.join(" "),
        stderr,
    }
}

fn split_nul(stdout: &str) -> Vec<String> {
    stdout
        .split('\0')
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Paths from `git status --porcelain=v1 -z` output.
///
/// Rename and copy entries carry the original path as an extra field, which
/// is skipped.
pub fn parse_status_paths(stdout: &str) -> Vec<String> {
    let mut paths = Vec::new();
    let mut fields = stdout.split('\0').filter(|s| !s.is_empty());
    while let Some(entry) = fields.next() {
        if entry.len() < 4 {
            continue;
        }
        let (status, path) = entry.split_at(3);
        paths.push(path.to_string());
        if status.contains('R') || status.contains('C') {
            fields.next();
        }
    }
    paths
}

/// Changes from `git diff --name-status --no-renames -z` output.
///
/// Anything other than an addition or deletion (content, mode or type
/// change) counts as a modification.
pub fn parse_name_status(stdout: &str) -> Vec<FileChange> {
    let mut changes = Vec::new();
    let mut fields = stdout.split('\0').filter(|s| !s.is_empty());
    while let Some(status) = fields.next() {
        let Some(path) = fields.next() else {
            break;
        };
        let kind = match status.chars().next() {
            Some('A') => ChangeKind::Added,
            Some('D') => ChangeKind::Deleted,
            _ => ChangeKind::Modified,
        };
        changes.push(FileChange {
            kind,
            path: path.to_string(),
        });
    }
    changes
}
