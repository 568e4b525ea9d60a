//! Per-host result records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::host::Host;

/// Output value for a host whose command ran but printed nothing
pub const PARSE_ERROR_SENTINEL: &str = "PARSE_ERROR";

/// Display status of a host in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostStatus {
    /// No result received yet
    #[default]
    Pending,
    /// Result received without an error
    Complete,
    /// Result received with an error
    Error,
}

impl HostStatus {
    /// Returns the status label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Complete => "Complete",
            Self::Error => "Error",
        }
    }
}

impl std::fmt::Display for HostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of running one command on one host
///
/// `output` and `error` are populated independently: a command may exit
/// non-zero and still yield a parsed value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostResult {
    /// Host display name
    pub hostname: String,
    /// Host address (correlation key)
    pub address: String,
    /// SSH port
    pub port: u16,
    /// Extracted value
    pub output: String,
    /// Error or diagnostic text
    pub error: String,
    /// Remote exit status, if the command ran
    pub exit_status: Option<i32>,
    /// When the result was produced
    pub completed_at: DateTime<Utc>,
}

impl HostResult {
    /// Creates an empty result for a host
    #[must_use]
    pub fn for_host(host: &Host) -> Self {
        Self {
            hostname: host.hostname.clone(),
            address: host.address.clone(),
            port: host.port,
            output: String::new(),
            error: String::new(),
            exit_status: None,
            completed_at: Utc::now(),
        }
    }

    /// Creates a result that carries only an error
    #[must_use]
    pub fn failed(host: &Host, error: impl Into<String>) -> Self {
        let mut result = Self::for_host(host);
        result.error = error.into();
        result
    }

    /// Returns true if no error was recorded
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_empty()
    }

    /// Returns true if an error was recorded
    #[must_use]
    pub fn is_failure(&self) -> bool {
        !self.error.is_empty()
    }

    /// Returns true if the command ran but printed nothing
    #[must_use]
    pub fn is_empty_output(&self) -> bool {
        self.output == PARSE_ERROR_SENTINEL
    }

    /// Returns the display status
    #[must_use]
    pub fn status(&self) -> HostStatus {
        if self.is_success() {
            HostStatus::Complete
        } else {
            HostStatus::Error
        }
    }
}
