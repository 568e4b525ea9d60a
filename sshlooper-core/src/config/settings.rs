//! Persistent settings

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Default number of hosts contacted at once
pub const DEFAULT_MAX_THREADS: usize = 5;

/// Default connection setup timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default interval between result sink polls in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// Settings loaded from `settings.toml`
///
/// Every field has a default, so a partial file (or none at all) is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Maximum number of hosts contacted concurrently
    pub max_threads: usize,
    /// Seconds allowed for connect, handshake and authentication
    pub connect_timeout_secs: u64,
    /// Username offered when none is given on the command line
    pub default_username: String,
    /// Host list CSV
    pub hosts_file: PathBuf,
    /// Directory of command catalog JSON files
    pub commands_dir: PathBuf,
    /// Log file used when logging to a file
    pub log_file: PathBuf,
    /// OpenSSH known_hosts file checked for mismatching keys
    #[serde(skip_serializing_if = "Option::is_none")]
    pub known_hosts: Option<PathBuf>,
    /// Extra substrings denied in manual commands
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub denied_commands: Vec<String>,
    /// Milliseconds between result sink polls
    pub poll_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_threads: DEFAULT_MAX_THREADS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            default_username: "root".to_string(),
            hosts_file: PathBuf::from("assets/hosts.csv"),
            commands_dir: PathBuf::from("config"),
            log_file: PathBuf::from("logs/error.log"),
            known_hosts: None,
            denied_commands: Vec::new(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl Settings {
    /// Checks that numeric settings are usable
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for zero threads, timeout or poll interval.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_threads == 0 {
            return Err(ConfigError::Invalid(
                "max_threads must be at least 1".to_string(),
            ));
        }
        if self.connect_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "connect_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Connection setup timeout as a `Duration`
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Poll interval as a `Duration`
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
