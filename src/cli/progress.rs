//! CLI progress callback

use crate::cli::style::{Stylize, check, cross, spinner_style};
use anstream::{eprintln, println};
use async_trait::async_trait;
use git_autosync::error::Error;
use git_autosync::sync::{ProgressCallback, RemoteOp, RemoteStatus};
use git_autosync::types::SessionState;
use indicatif::ProgressBar;
use std::sync::Mutex;
use std::time::Duration;

/// CLI progress callback that prints step lines to stdout
///
/// Quiet mode prints nothing; failures are reported by the caller.
pub struct CliProgress {
    quiet: bool,
    spinner: Mutex<Option<ProgressBar>>,
}

impl CliProgress {
    /// Create progress output, silent when `quiet`
    pub const fn new(quiet: bool) -> Self {
        Self {
            quiet,
            spinner: Mutex::new(None),
        }
    }

    fn start_spinner(&self, message: String) {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(spinner_style());
        spinner.set_message(message);
        spinner.enable_steady_tick(Duration::from_millis(80));
        if let Ok(mut slot) = self.spinner.lock() {
            *slot = Some(spinner);
        }
    }

    fn stop_spinner(&self) {
        if let Ok(mut slot) = self.spinner.lock() {
            if let Some(spinner) = slot.take() {
                spinner.finish_and_clear();
            }
        }
    }
}

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_phase(&self, phase: SessionState) {
        if self.quiet {
            return;
        }
        match phase {
            SessionState::Captured
            | SessionState::Synced
            | SessionState::Reintegrated
            | SessionState::Committed
            | SessionState::Published => println!("{} {phase}", check()),
            SessionState::Failed => self.stop_spinner(),
            SessionState::Start | SessionState::Validated | SessionState::Done => {}
        }
    }

    async fn on_remote(&self, op: RemoteOp, remote: &str, status: RemoteStatus) {
        if self.quiet {
            return;
        }
        match (&status, op) {
            (RemoteStatus::Started, RemoteOp::Fetch) => {
                self.start_spinner(format!("Fetching from {}...", remote.accent()));
            }
            (RemoteStatus::Started, RemoteOp::Push) => {
                self.start_spinner(format!("Pushing to {}...", remote.accent()));
            }
            (RemoteStatus::Success, _) => {
                self.stop_spinner();
                println!("  {} {op} {}", "done:".muted(), remote.accent());
            }
            (RemoteStatus::AlreadySynced, _) => {
                println!("  {} {}", "-".muted(), format!("{remote} {status}").muted());
            }
            (RemoteStatus::Failed(_), _) => {
                self.stop_spinner();
                eprintln!("  {} {op} {remote} {status}", cross());
            }
        }
    }

    async fn on_error(&self, error: &Error) {
        self.stop_spinner();
        eprintln!("  {} {}", "warning:".failure(), error);
    }

    async fn on_message(&self, message: &str) {
        if !self.quiet {
            println!("  {}", message.muted());
        }
    }
}
