//! Result export to CSV and JSON
//!
//! Results are merged back onto the host list by address so that every
//! host appears exactly once in the export, including hosts that never
//! reported.

use std::collections::{HashMap, VecDeque};
use std::fmt::Write as _;
use std::path::Path;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::{ExportError, ExportResult};
use crate::models::{HostEntry, HostResult, HostStatus};
use crate::tracing::span_names;

/// Header row of CSV exports
pub const CSV_HEADER: &str = "Hostname,IP,Port,Timestamp,Output,Error";

/// Timestamp format used in exported records
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Comma-separated values
    #[default]
    Csv,
    /// Pretty-printed JSON array
    Json,
}

impl ExportFormat {
    /// File extension without the dot
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    /// Guesses the format from a file extension
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// One exported row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRecord {
    /// Host name from the host list
    pub hostname: String,
    /// Address
    pub ip: String,
    /// SSH port
    pub port: u16,
    /// Local completion time, empty for hosts that never reported
    pub timestamp: String,
    /// Extracted value
    pub output: String,
    /// Error text
    pub error: String,
    /// Pending, complete or error
    pub status: HostStatus,
}

impl ExportRecord {
    fn pending(host: &HostEntry) -> Self {
        Self {
            hostname: host.hostname.clone(),
            ip: host.address.clone(),
            port: host.port,
            timestamp: String::new(),
            output: String::new(),
            error: String::new(),
            status: HostStatus::Pending,
        }
    }

    fn from_result(host: &HostEntry, result: &HostResult) -> Self {
        Self {
            hostname: host.hostname.clone(),
            ip: host.address.clone(),
            port: host.port,
            timestamp: result
                .completed_at
                .with_timezone(&Local)
                .format(TIMESTAMP_FORMAT)
                .to_string(),
            output: result.output.clone(),
            error: result.error.clone(),
            status: result.status(),
        }
    }
}

/// Pairs each host with its result by address, keeping host list order
///
/// When an address appears more than once, results are handed out in the
/// order they arrived.
#[must_use]
pub fn merge_results(hosts: &[HostEntry], results: &[HostResult]) -> Vec<ExportRecord> {
    let mut by_address: HashMap<&str, VecDeque<&HostResult>> = HashMap::new();
    for result in results {
        by_address
            .entry(result.address.as_str())
            .or_default()
            .push_back(result);
    }

    hosts
        .iter()
        .map(|host| {
            by_address
                .get_mut(host.address.as_str())
                .and_then(VecDeque::pop_front)
                .map_or_else(
                    || ExportRecord::pending(host),
                    |result| ExportRecord::from_result(host, result),
                )
        })
        .collect()
}

/// Quotes a field when it contains a comma, quote or line break
#[must_use]
pub fn escape_csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Renders records as CSV with [`CSV_HEADER`]
#[must_use]
pub fn to_csv(records: &[ExportRecord]) -> String {
    let mut output = String::new();
    output.push_str(CSV_HEADER);
    output.push_str("\r\n");

    for record in records {
        let _ = write!(
            output,
            "{},{},{},{},{},{}\r\n",
            escape_csv_field(&record.hostname),
            escape_csv_field(&record.ip),
            record.port,
            escape_csv_field(&record.timestamp),
            escape_csv_field(&record.output),
            escape_csv_field(&record.error),
        );
    }

    output
}

/// Renders records as a pretty-printed JSON array
///
/// # Errors
///
/// Returns `ExportError::Serialize` if serialization fails.
pub fn to_json(records: &[ExportRecord]) -> ExportResult<String> {
    serde_json::to_string_pretty(records).map_err(|e| ExportError::Serialize(e.to_string()))
}

/// Writes records to `path` in `format`, creating parent directories
///
/// # Errors
///
/// Returns an error if rendering or writing fails.
pub fn write_export(path: &Path, format: ExportFormat, records: &[ExportRecord]) -> ExportResult<()> {
    let _span = tracing::info_span!(
        span_names::EXPORT_EXECUTE,
        format = %format,
        item_count = records.len()
    )
    .entered();

    let body = match format {
        ExportFormat::Csv => to_csv(records),
        ExportFormat::Json => to_json(records)?,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| ExportError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, body).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(path = %path.display(), "Results exported");
    Ok(())
}

/// `results_YYYYmmdd_HHMMSS.<ext>` for the given time
#[must_use]
pub fn default_file_name(format: ExportFormat, at: DateTime<Local>) -> String {
    format!(
        "results_{}.{}",
        at.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}
