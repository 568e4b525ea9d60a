//! Command catalog listing.

use std::fmt::Write as _;
use std::path::Path;

use serde::Serialize;
use sshlooper_core::export::escape_csv_field;
use sshlooper_core::{CatalogEntry, CommandCatalog};

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::util::load_settings;

/// Commands command handler
pub fn cmd_commands(
    config_path: Option<&Path>,
    filter: Option<&str>,
    format: OutputFormat,
) -> Result<(), CliError> {
    let settings = load_settings(config_path)?;
    let catalog = CommandCatalog::load_dir(&settings.commands_dir)?;

    for skipped in &catalog.skipped {
        eprintln!("Warning: skipped {}: {}", skipped.path.display(), skipped.reason);
    }

    let entries: Vec<&CatalogEntry> = match filter {
        Some(keyword) => catalog.filter(keyword),
        None => catalog.entries().collect(),
    };

    match format {
        OutputFormat::Table => println!("{}", format_table(&entries)),
        OutputFormat::Json => println!("{}", format_json(&entries)?),
        OutputFormat::Csv => println!("{}", format_csv(&entries)),
    }

    Ok(())
}

/// Format catalog entries as a table string
#[must_use]
pub fn format_table(entries: &[&CatalogEntry]) -> String {
    if entries.is_empty() {
        return "No commands found.".to_string();
    }

    let mut output = String::new();

    let key_width = entries
        .iter()
        .map(|e| e.key.len())
        .max()
        .unwrap_or(3)
        .max(3);

    let _ = writeln!(output, "{:<key_width$}  COMMAND", "KEY");
    let _ = writeln!(output, "{:-<key_width$}  {:-<7}", "", "");

    for entry in entries {
        let _ = writeln!(
            output,
            "{:<key_width$}  {}",
            entry.key,
            crate::format::truncate(&entry.spec.command, 60)
        );
    }

    output.trim_end().to_string()
}

/// Catalog entry as printed in JSON
#[derive(Debug, Serialize)]
struct EntryOutput<'a> {
    key: &'a str,
    category: &'a str,
    label: &'a str,
    command: &'a str,
    pattern: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    description: &'a str,
}

impl<'a> From<&'a CatalogEntry> for EntryOutput<'a> {
    fn from(entry: &'a CatalogEntry) -> Self {
        Self {
            key: &entry.key,
            category: &entry.category,
            label: &entry.label,
            command: &entry.spec.command,
            pattern: &entry.spec.pattern,
            description: &entry.spec.description,
        }
    }
}

/// Format catalog entries as JSON string
///
/// # Errors
///
/// Returns `CliError::Config` if JSON serialization fails.
pub fn format_json(entries: &[&CatalogEntry]) -> Result<String, CliError> {
    let output: Vec<EntryOutput<'_>> = entries.iter().map(|e| EntryOutput::from(*e)).collect();
    serde_json::to_string_pretty(&output)
        .map_err(|e| CliError::Config(format!("Failed to serialize to JSON: {e}")))
}

/// Format catalog entries as CSV string
#[must_use]
pub fn format_csv(entries: &[&CatalogEntry]) -> String {
    let mut output = String::from("key,command,pattern\n");
    for entry in entries {
        let _ = writeln!(
            output,
            "{},{},{}",
            escape_csv_field(&entry.key),
            escape_csv_field(&entry.spec.command),
            escape_csv_field(&entry.spec.pattern)
        );
    }
    output.trim_end().to_string()
}
