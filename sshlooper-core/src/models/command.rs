//! Command specifications

use serde::{Deserialize, Serialize};

/// Pattern that captures every non-empty line of output
///
/// Manually entered commands use this pattern, and an empty pattern is
/// treated the same way.
pub const ACCEPT_ALL_PATTERN: &str = "(.+)";

/// A command to run on every host, plus how to read its output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    /// Shell command sent to the remote host
    pub command: String,
    /// Regular expression applied to stdout (at most one capture group)
    #[serde(rename = "parse", default)]
    pub pattern: String,
    /// Human-readable description shown in listings
    #[serde(default)]
    pub description: String,
}

impl CommandSpec {
    /// Creates a command spec with an extraction pattern
    #[must_use]
    pub fn new(command: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            pattern: pattern.into(),
            description: String::new(),
        }
    }

    /// Creates a spec for a manually entered command, capturing all output
    #[must_use]
    pub fn manual(command: impl Into<String>) -> Self {
        Self::new(command, ACCEPT_ALL_PATTERN)
    }

    /// Sets the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns true if every match of the pattern should be collected
    #[must_use]
    pub fn is_accept_all(&self) -> bool {
        is_accept_all(&self.pattern)
    }
}

/// Returns true if `pattern` is the accept-all form (empty or [`ACCEPT_ALL_PATTERN`])
#[must_use]
pub fn is_accept_all(pattern: &str) -> bool {
    let trimmed = pattern.trim();
    trimmed.is_empty() || trimmed == ACCEPT_ALL_PATTERN
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_spec_accepts_all() {
        let spec = CommandSpec::manual("uptime");
        assert_eq!(spec.pattern, ACCEPT_ALL_PATTERN);
        assert!(spec.is_accept_all());
    }

    #[test]
    fn test_empty_pattern_accepts_all() {
        assert!(CommandSpec::new("uptime", "").is_accept_all());
        assert!(CommandSpec::new("uptime", "   ").is_accept_all());
        assert!(!CommandSpec::new("uptime", "up (\\d+) days").is_accept_all());
    }

    #[test]
    fn test_deserialize_uses_parse_key() {
        let spec: CommandSpec = serde_json::from_str(
            r#"{"command": "df -h /", "parse": "(\\d+)%", "description": "Root usage"}"#,
        )
        .unwrap();

        assert_eq!(spec.command, "df -h /");
        assert_eq!(spec.pattern, "(\\d+)%");
        assert_eq!(spec.description, "Root usage");
    }

    #[test]
    fn test_deserialize_defaults_missing_fields() {
        let spec: CommandSpec = serde_json::from_str(r#"{"command": "hostname"}"#).unwrap();
        assert!(spec.pattern.is_empty());
        assert!(spec.description.is_empty());
        assert!(spec.is_accept_all());
    }
}
