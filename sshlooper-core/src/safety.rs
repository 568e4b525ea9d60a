//! Command safety filter for manually entered commands
//!
//! Catalog commands are vetted by whoever writes the catalog and are never
//! passed through this filter.

use crate::error::{DispatchError, DispatchResult};

/// Substrings that make a manual command unsafe to broadcast
///
/// Matching is case-insensitive and substring-based, so `sudo reboot now`
/// and `REBOOT` are both rejected.
pub const DEFAULT_DENIED_COMMANDS: &[&str] = &[
    "reboot",
    "shutdown",
    "poweroff",
    "halt",
    "init 0",
    "init 6",
    "rm -rf",
    "rm -fr",
    "mkfs",
    "dd if=",
    "fdisk",
    "parted",
    "wipefs",
    "shred",
    "> /dev/sd",
    "chmod -r 777 /",
    "userdel",
    "chpasswd",
    ":(){",
    "kill -9 1",
];

/// Rejects commands that contain a denied substring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandFilter {
    denied: Vec<String>,
}

impl CommandFilter {
    /// Creates a filter with [`DEFAULT_DENIED_COMMANDS`]
    #[must_use]
    pub fn new() -> Self {
        Self {
            denied: DEFAULT_DENIED_COMMANDS
                .iter()
                .map(|word| (*word).to_string())
                .collect(),
        }
    }

    /// Adds extra denied substrings; the defaults are always kept
    #[must_use]
    pub fn with_denied<I, S>(mut self, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for word in extra {
            let word = word.as_ref().trim().to_lowercase();
            if !word.is_empty() && !self.denied.contains(&word) {
                self.denied.push(word);
            }
        }
        self
    }

    /// Returns the denied substrings
    #[must_use]
    pub fn denied_words(&self) -> &[String] {
        &self.denied
    }

    /// Returns the first denied substring found in `command`
    #[must_use]
    pub fn offending_word(&self, command: &str) -> Option<&str> {
        let lowered = command.to_lowercase();
        self.denied
            .iter()
            .find(|word| lowered.contains(word.as_str()))
            .map(String::as_str)
    }

    /// Returns true if `command` contains no denied substring
    #[must_use]
    pub fn approve(&self, command: &str) -> bool {
        self.offending_word(command).is_none()
    }

    /// Checks `command`, returning the offending substring as an error
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::CommandRejected` if a denied substring is found.
    pub fn check(&self, command: &str) -> DispatchResult<()> {
        match self.offending_word(command) {
            Some(word) => {
                tracing::warn!(word, "Manual command rejected by safety filter");
                Err(DispatchError::CommandRejected {
                    word: word.to_string(),
                })
            }
            None => Ok(()),
        }
    }
}

impl Default for CommandFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// Checks `command` against the default denied list
#[must_use]
pub fn approve(command: &str) -> bool {
    CommandFilter::new().approve(command)
}
