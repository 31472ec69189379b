//! Sync command - reconcile the working copy with upstream

use crate::cli::CliProgress;
use crate::cli::style::{Stylize, check, cross};
use anstream::{eprintln, println};
use git_autosync::error::{Error, Result};
use git_autosync::sync::sync_repository;
use git_autosync::types::SyncOptions;
use std::path::Path;

/// Run one sync session and print its summary
pub async fn run_sync(path: &Path, options: SyncOptions, quiet: bool) -> Result<()> {
    let progress = CliProgress::new(quiet);
    let upstream = options.upstream_name();
    let report = sync_repository(path, options, &progress).await?;

    if quiet {
        return Ok(());
    }

    println!();
    if report.already_in_sync() {
        println!("{} {}", check(), "Already in sync".emphasis());
        return Ok(());
    }

    println!(
        "{} {} pushed {} commit(s) to {}",
        check(),
        "Sync complete:".emphasis(),
        report.ahead,
        upstream.accent()
    );
    Ok(())
}

/// Print a failure report to stderr
pub fn report_failure(err: &Error) {
    eprintln!("{} {}: {}", cross(), err.kind().failure(), err);
    if err.needs_manual_resolution() {
        eprintln!();
        eprintln!(
            "{}",
            "The working copy now contains conflict markers and was NOT rolled back.".emphasis()
        );
        if let Error::ReintegrationConflict { label, .. } = err {
            eprintln!(
                "  {}",
                format!(
                    "Resolve the conflicts, then find '{label}' in `git stash list` and drop that entry."
                )
                .muted()
            );
        }
        eprintln!(
            "  {}",
            "Run git-autosync again once `git status` is clean of conflicts.".muted()
        );
    }
}
