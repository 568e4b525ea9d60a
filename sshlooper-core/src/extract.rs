//! Output extraction via regular expressions
//!
//! A command's stdout is reduced to a single value with the command's
//! extraction pattern. Two modes exist:
//!
//! - accept-all (empty pattern or [`ACCEPT_ALL_PATTERN`]): every
//!   non-overlapping match is collected and joined with newlines
//! - single: the first match is used, preferring its first capture group
//!
//! Patterns are compiled once per dispatch by [`Extractor`]; a bad pattern
//! becomes a per-host error, never a panic.

use regex::Regex;
use thiserror::Error;

use crate::models::{ACCEPT_ALL_PATTERN, is_accept_all};

/// Errors produced while extracting a value from command output
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// The extraction pattern does not compile
    #[error("invalid pattern '{pattern}': {reason}")]
    PatternInvalid {
        /// The pattern that failed to compile
        pattern: String,
        /// Compiler message
        reason: String,
    },

    /// Single-match mode found nothing
    #[error("pattern not found")]
    NoMatch,

    /// Accept-all mode found nothing
    #[error("no matches found")]
    NoMatches,
}

/// Result type for extraction
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;

/// A compiled extraction pattern
#[derive(Debug, Clone)]
pub struct Extractor {
    regex: ExtractResult<Regex>,
    accept_all: bool,
}

impl Extractor {
    /// Compiles `pattern`; compilation errors are kept and reported by [`Self::extract`]
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        let accept_all = is_accept_all(pattern);
        let trimmed = pattern.trim();
        let source = if trimmed.is_empty() {
            ACCEPT_ALL_PATTERN
        } else {
            trimmed
        };

        let regex = Regex::new(source).map_err(|e| ExtractError::PatternInvalid {
            pattern: source.to_string(),
            reason: e.to_string(),
        });

        Self { regex, accept_all }
    }

    /// Returns true if every match is collected
    #[must_use]
    pub const fn is_accept_all(&self) -> bool {
        self.accept_all
    }

    /// Returns the compile error, if the pattern is invalid
    #[must_use]
    pub fn pattern_error(&self) -> Option<&ExtractError> {
        self.regex.as_ref().err()
    }

    /// Extracts a value from `stdout`
    ///
    /// # Errors
    ///
    /// Returns `PatternInvalid` for a bad pattern, `NoMatches` when
    /// accept-all mode finds nothing and `NoMatch` when single mode finds
    /// nothing.
    pub fn extract(&self, stdout: &str) -> ExtractResult<String> {
        let regex = self.regex.as_ref().map_err(Clone::clone)?;
        let has_group = regex.captures_len() > 1;

        if self.accept_all {
            let values: Vec<&str> = regex
                .captures_iter(stdout)
                .map(|caps| captured(&caps, has_group))
                .filter(|value| !value.is_empty())
                .collect();

            if values.is_empty() {
                return Err(ExtractError::NoMatches);
            }
            return Ok(values.join("\n"));
        }

        regex
            .captures(stdout)
            .map(|caps| captured(&caps, has_group).to_string())
            .ok_or(ExtractError::NoMatch)
    }
}

fn captured<'h>(caps: &regex::Captures<'h>, has_group: bool) -> &'h str {
    let text = if has_group {
        caps.get(1).map_or("", |m| m.as_str())
    } else {
        caps.get(0).map_or("", |m| m.as_str())
    };
    // Network gear often answers with CRLF line endings
    text.trim_end_matches('\r')
}

/// Compiles `pattern` and extracts a value from `stdout` in one step
///
/// # Errors
///
/// See [`Extractor::extract`].
pub fn extract(stdout: &str, pattern: &str) -> ExtractResult<String> {
    Extractor::new(pattern).extract(stdout)
}
