//! CLI error types and exit codes.

use sshlooper_core::{ConfigError, DispatchError, ExportError, LoadError};

/// Exit codes for CLI operations
pub mod exit_codes {
    /// General error - configuration, loading, export or other errors
    pub const GENERAL_ERROR: i32 = 1;
    /// At least one host failed or could not be reached
    pub const HOST_FAILURE: i32 = 2;
    /// A manual command was rejected by the safety filter
    pub const COMMAND_REJECTED: i32 = 3;
}

/// CLI error type
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Host list or catalog could not be loaded
    #[error("Load error: {0}")]
    Load(String),

    /// Catalog key not found
    #[error("Command not found in catalog: {0}")]
    CommandNotFound(String),

    /// Dispatch could not start
    #[error("Dispatch error: {0}")]
    Dispatch(String),

    /// Manual command contains a denied word
    #[error("Command rejected: contains restricted word '{0}'")]
    Rejected(String),

    /// Some hosts reported errors
    #[error("{0}")]
    HostsFailed(String),

    /// Export error
    #[error("Export error: {0}")]
    Export(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<LoadError> for CliError {
    fn from(err: LoadError) -> Self {
        Self::Load(err.to_string())
    }
}

impl From<ExportError> for CliError {
    fn from(err: ExportError) -> Self {
        Self::Export(err.to_string())
    }
}

impl From<DispatchError> for CliError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::CommandRejected { word } => Self::Rejected(word),
            other => Self::Dispatch(other.to_string()),
        }
    }
}

impl CliError {
    /// Returns the appropriate exit code for this error type.
    ///
    /// Exit codes:
    /// - 0: Success (not an error)
    /// - 1: General error (configuration, loading, export, IO)
    /// - 2: Host failure (any host reported an error)
    /// - 3: Manual command rejected by the safety filter
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::HostsFailed(_) => exit_codes::HOST_FAILURE,
            Self::Rejected(_) => exit_codes::COMMAND_REJECTED,
            Self::Config(_)
            | Self::Load(_)
            | Self::CommandNotFound(_)
            | Self::Dispatch(_)
            | Self::Export(_)
            | Self::Io(_) => exit_codes::GENERAL_ERROR,
        }
    }
}
