//! Remote sessions: connect, execute, capture, close
//!
//! [`RemoteExecutor`] is the seam between the worker pool and the transport.
//! [`SshExecutor`] is the production implementation; tests plug in their own.

mod ssh;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::Host;

pub use ssh::SshExecutor;

/// Errors raised while talking to a remote host
///
/// All variants are terminal for the host; they differ only in message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The server rejected the credentials
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Handshake, host key, channel or other protocol-level failure
    #[error("SSH error: {0}")]
    Protocol(String),

    /// The host could not be reached in time
    #[error("Connection failed: {0}")]
    Connectivity(String),
}

impl SessionError {
    /// Returns true for authentication failures
    #[must_use]
    pub const fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }

    /// Returns true for reachability failures
    #[must_use]
    pub const fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity(_))
    }
}

/// Result type for session operations
pub type SessionResult<T> = std::result::Result<T, SessionError>;

/// Captured result of a remote command
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandOutput {
    /// Full stdout, lossily decoded
    pub stdout: String,
    /// Full stderr, lossily decoded
    pub stderr: String,
    /// Remote exit status (`-1` when the server did not report one)
    pub exit_status: i32,
}

impl CommandOutput {
    /// Creates a command output
    #[must_use]
    pub fn new(stdout: impl Into<String>, stderr: impl Into<String>, exit_status: i32) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_status,
        }
    }

    /// Returns true if the command exited zero
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.exit_status == 0
    }
}

/// Runs a command on one host over a fresh connection
///
/// Implementations must release the connection on every path before
/// returning. `connect_timeout` bounds connection setup only; command
/// execution is not time-bounded.
#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    /// Connects to `host`, runs `command` and captures its output
    async fn execute(
        &self,
        host: Arc<Host>,
        command: &str,
        connect_timeout: Duration,
    ) -> SessionResult<CommandOutput>;
}
