//! git-autosync - keep a working copy folded into its upstream
//!
//! A single run captures pending edits, rebases local history onto the
//! upstream branch, reapplies the edits, commits them with a generated
//! summary and pushes the result.
//!
//! # Example
//!
//! ```no_run
//! use git_autosync::sync::{NoopProgress, sync_repository};
//! use git_autosync::types::SyncOptions;
//! use std::path::Path;
//!
//! # async fn run() -> git_autosync::error::Result<()> {
//! let report = sync_repository(Path::new("."), SyncOptions::default(), &NoopProgress).await?;
//! if report.already_in_sync() {
//!     println!("nothing to do");
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod lock;
pub mod repo;
pub mod sync;
pub mod types;
