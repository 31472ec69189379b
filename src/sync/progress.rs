//! Progress callback trait for interface-agnostic updates
//!
//! Lets the CLI (or anything else driving a session) render step-by-step
//! status without the session knowing how it is displayed.

use crate::error::Error;
use crate::types::SessionState;
use async_trait::async_trait;
use std::fmt;

/// Operation that talks to the remote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteOp {
    /// Retrieving upstream history
    Fetch,
    /// Publishing local history
    Push,
}

impl fmt::Display for RemoteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch => write!(f, "fetch"),
            Self::Push => write!(f, "push"),
        }
    }
}

/// Status of a remote operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteStatus {
    /// Operation started
    Started,
    /// Operation succeeded
    Success,
    /// Nothing needed to be sent
    AlreadySynced,
    /// Operation failed with error message
    Failed(String),
}

impl fmt::Display for RemoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started => write!(f, "started"),
            Self::Success => write!(f, "success"),
            Self::AlreadySynced => write!(f, "already synced"),
            Self::Failed(msg) => write!(f, "failed: {msg}"),
        }
    }
}

/// Progress callback trait
///
/// Implement this trait to receive progress updates during a sync session.
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// Called when the session enters a new state
    async fn on_phase(&self, phase: SessionState);

    /// Called as a remote operation starts and finishes
    async fn on_remote(&self, op: RemoteOp, remote: &str, status: RemoteStatus);

    /// Called when an error occurs that does not end the session by itself
    async fn on_error(&self, error: &Error);

    /// Called with a general status message
    async fn on_message(&self, message: &str);
}

/// No-op progress callback for testing or when progress isn't needed
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_phase(&self, _phase: SessionState) {}
    async fn on_remote(&self, _op: RemoteOp, _remote: &str, _status: RemoteStatus) {}
    async fn on_error(&self, _error: &Error) {}
    async fn on_message(&self, _message: &str) {}
}
