//! git-autosync - fold local edits into upstream and republish
//!
//! CLI binary. Runs one sync session against the repository containing the
//! current directory and exits 0 on success, 1 on any failure.

use clap::{ArgAction, Parser};
use git_autosync::types::{DEFAULT_BRANCH, DEFAULT_REMOTE, SyncOptions};
use std::path::PathBuf;
use std::process::ExitCode;

mod cli;

#[derive(Parser)]
#[command(name = "git-autosync")]
#[command(about = "Capture local edits, rebase onto upstream, commit and push")]
#[command(version)]
struct Cli {
    /// Path inside the repository (defaults to current directory)
    #[arg(short, long)]
    path: Option<PathBuf>,

    /// Remote to sync with
    #[arg(short, long, default_value = DEFAULT_REMOTE)]
    remote: String,

    /// Branch on the remote to rebase onto and push to
    #[arg(short, long, default_value = DEFAULT_BRANCH)]
    branch: String,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only print failures
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = cli::init_logging(cli.verbose, cli.quiet) {
        eprintln!("warning: {err:#}");
    }

    let path = cli.path.unwrap_or_else(|| PathBuf::from("."));
    let options = SyncOptions {
        remote: cli.remote,
        branch: cli.branch,
    };

    match cli::run_sync(&path, options, cli.quiet).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            cli::report_failure(&err);
            ExitCode::FAILURE
        }
    }
}
