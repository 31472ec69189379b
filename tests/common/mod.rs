//! Common test utilities for git-autosync tests

pub mod mock_engine;
pub mod temp_repo;

// Re-exports for convenience - not all test binaries use all exports
#[allow(unused_imports)]
pub use mock_engine::{MockGitEngine, RecordingProgress, fake_handle};
#[allow(unused_imports)]
pub use temp_repo::{TempGitRemote, commit_file, git, history, host_identifier, subjects};
