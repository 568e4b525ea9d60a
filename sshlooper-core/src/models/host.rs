//! Host records consumed by the dispatcher

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::credentials::Credentials;

/// Default SSH port
pub const DEFAULT_SSH_PORT: u16 = 22;

/// A host as read from the host list, before credentials are attached
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostEntry {
    /// Display name of the host
    pub hostname: String,
    /// IP address or resolvable name; the correlation key for results
    pub address: String,
    /// SSH port
    pub port: u16,
}

impl HostEntry {
    /// Creates a new host entry
    #[must_use]
    pub fn new(hostname: impl Into<String>, address: impl Into<String>, port: u16) -> Self {
        Self {
            hostname: hostname.into(),
            address: address.into(),
            port,
        }
    }
}

/// A host ready for dispatch, with the session credential attached
///
/// Hosts are shared read-only between the pool and the task that owns them.
#[derive(Debug)]
pub struct Host {
    /// Display name of the host
    pub hostname: String,
    /// IP address or resolvable name
    pub address: String,
    /// SSH port (zero means unset)
    pub port: u16,
    /// Login name
    pub username: String,
    /// Password used for authentication
    pub credential: SecretString,
}

impl Host {
    /// Creates a new dispatch-ready host
    #[must_use]
    pub fn new(
        hostname: impl Into<String>,
        address: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        credential: SecretString,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            address: address.into(),
            port,
            username: username.into(),
            credential,
        }
    }

    /// Attaches session credentials to a host list entry
    #[must_use]
    pub fn from_entry(entry: &HostEntry, credentials: &Credentials) -> Self {
        Self {
            hostname: entry.hostname.clone(),
            address: entry.address.clone(),
            port: entry.port,
            username: credentials.username.clone(),
            credential: SecretString::from(credentials.password.expose_secret().to_owned()),
        }
    }

    /// Returns the names of required connection fields that are empty
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.address.trim().is_empty() {
            missing.push("address");
        }
        if self.port == 0 {
            missing.push("port");
        }
        if self.username.trim().is_empty() {
            missing.push("username");
        }
        if self.credential.expose_secret().is_empty() {
            missing.push("credential");
        }
        missing
    }

    /// Returns `address:port` for log lines
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host(address: &str, port: u16, username: &str, password: &str) -> Host {
        Host::new(
            "web01",
            address,
            port,
            username,
            SecretString::from(password.to_string()),
        )
    }

    #[test]
    fn test_complete_host_has_no_missing_fields() {
        assert!(host("10.0.0.1", 22, "root", "secret").missing_fields().is_empty());
    }

    #[test]
    fn test_missing_fields_are_listed_in_order() {
        let missing = host("", 0, "", "").missing_fields();
        assert_eq!(missing, vec!["address", "port", "username", "credential"]);
    }

    #[test]
    fn test_whitespace_username_counts_as_missing() {
        assert_eq!(
            host("10.0.0.1", 22, "  ", "pw").missing_fields(),
            vec!["username"]
        );
    }

    #[test]
    fn test_from_entry_attaches_credentials() {
        let entry = HostEntry::new("db01", "192.168.1.20", 2222);
        let credentials = Credentials::new("admin", "hunter2");
        let host = Host::from_entry(&entry, &credentials);

        assert_eq!(host.hostname, "db01");
        assert_eq!(host.address, "192.168.1.20");
        assert_eq!(host.port, 2222);
        assert_eq!(host.username, "admin");
        assert_eq!(host.credential.expose_secret(), "hunter2");
        assert_eq!(host.endpoint(), "192.168.1.20:2222");
    }

    #[test]
    fn test_debug_does_not_leak_credential() {
        let rendered = format!("{:?}", host("10.0.0.1", 22, "root", "topsecret"));
        assert!(!rendered.contains("topsecret"));
    }
}
