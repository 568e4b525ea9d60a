//! Error types for SSH Looper
//!
//! Per-host failures ([`HostError`]) never leave the task that produced them;
//! they are rendered into the `error` field of a `HostResult`. Dispatch-time
//! failures ([`DispatchError`]) stop a run before any host is contacted.

use std::path::PathBuf;

use thiserror::Error;

use crate::extract::ExtractError;
use crate::session::{CommandOutput, SessionError};

/// Failure of a single host's task
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    /// Required connection fields were empty; no connection was attempted
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// Authentication, protocol or connectivity failure
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Pattern compile failure or no match
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// The command exited non-zero or wrote to stderr
    #[error("Exit Code {code}: {stderr}")]
    NonZeroExit {
        /// Remote exit status
        code: i32,
        /// Trimmed stderr text
        stderr: String,
    },

    /// The task itself panicked or was aborted
    #[error("task failed: {0}")]
    TaskFailed(String),
}

impl HostError {
    /// Builds the provisional exit error for a finished command, if any
    #[must_use]
    pub fn from_exit(output: &CommandOutput) -> Option<Self> {
        let stderr = output.stderr.trim();
        if output.exit_status != 0 || !stderr.is_empty() {
            Some(Self::NonZeroExit {
                code: output.exit_status,
                stderr: stderr.to_string(),
            })
        } else {
            None
        }
    }
}

/// Errors that prevent a dispatch from starting
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A manual command contains a denied substring
    #[error("command rejected: contains restricted word '{word}'")]
    CommandRejected {
        /// The denied substring that matched
        word: String,
    },

    /// The host list is empty
    #[error("no hosts to dispatch to")]
    NoHosts,

    /// Username or password missing for the dispatch
    #[error("missing credentials: {0}")]
    MissingCredentials(String),

    /// No tokio runtime is available to run the pool
    #[error("no async runtime available: {0}")]
    NoRuntime(String),

    /// The pool driver failed before all tasks reported
    #[error("worker pool failed: {0}")]
    PoolFailed(String),
}

/// Result type for dispatch operations
pub type DispatchResult<T> = std::result::Result<T, DispatchError>;

/// Errors loading host lists and command catalogs
#[derive(Debug, Error)]
pub enum LoadError {
    /// File or directory could not be read or written
    #[error("{}: {source}", path.display())]
    Io {
        /// Offending path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Required CSV columns are absent from the header
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// The file has no header row
    #[error("file is empty: {}", .0.display())]
    Empty(PathBuf),

    /// Refused to overwrite an existing file
    #[error("file already exists: {}", .0.display())]
    AlreadyExists(PathBuf),
}

/// Result type for load operations
pub type LoadResult<T> = std::result::Result<T, LoadError>;

/// Errors writing exported results
#[derive(Debug, Error)]
pub enum ExportError {
    /// Output file could not be written
    #[error("failed to write {}: {source}", path.display())]
    Io {
        /// Output path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Records could not be serialized
    #[error("failed to serialize results: {0}")]
    Serialize(String),

    /// Unknown export format name
    #[error("unsupported export format: {0}")]
    UnsupportedFormat(String),
}

/// Result type for export operations
pub type ExportResult<T> = std::result::Result<T, ExportError>;

/// Errors loading or saving settings
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Settings file could not be read or written
    #[error("{}: {source}", path.display())]
    Io {
        /// Offending path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Settings file is not valid TOML
    #[error("failed to parse settings: {0}")]
    Parse(String),

    /// Settings could not be serialized
    #[error("failed to serialize settings: {0}")]
    Serialize(String),

    /// A setting has an unusable value
    #[error("invalid setting: {0}")]
    Invalid(String),

    /// No configuration directory could be determined
    #[error("could not determine configuration directory")]
    NoConfigDir,
}

/// Result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
