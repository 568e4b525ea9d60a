//! Host list command.

use std::fmt::Write as _;
use std::path::Path;

use sshlooper_core::export::escape_csv_field;
use sshlooper_core::{HostEntry, load_hosts_csv, write_sample};

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::util::load_settings;

/// Hosts command handler
///
/// Lists the host list, or writes a sample one with `init`.
pub fn cmd_hosts(
    config_path: Option<&Path>,
    file: Option<&Path>,
    init: bool,
    format: OutputFormat,
) -> Result<(), CliError> {
    let settings = load_settings(config_path)?;
    let path = file.unwrap_or(&settings.hosts_file);

    if init {
        write_sample(path)?;
        println!("Created sample host list at {}", path.display());
        return Ok(());
    }

    let list = load_hosts_csv(path)?;
    for skipped in &list.skipped {
        eprintln!(
            "Warning: {} line {}: {}",
            path.display(),
            skipped.line,
            skipped.reason
        );
    }

    match format {
        OutputFormat::Table => println!("{}", format_table(&list.hosts)),
        OutputFormat::Json => println!("{}", format_json(&list.hosts)?),
        OutputFormat::Csv => println!("{}", format_csv(&list.hosts)),
    }

    Ok(())
}

/// Format hosts as a table string
#[must_use]
pub fn format_table(hosts: &[HostEntry]) -> String {
    if hosts.is_empty() {
        return "No hosts found.".to_string();
    }

    let mut output = String::new();

    let name_width = hosts
        .iter()
        .map(|h| h.hostname.len())
        .max()
        .unwrap_or(8)
        .max(8);
    let ip_width = hosts
        .iter()
        .map(|h| h.address.len())
        .max()
        .unwrap_or(2)
        .max(2);

    let _ = writeln!(
        output,
        "{:<name_width$}  {:<ip_width$}  PORT",
        "HOSTNAME", "IP"
    );
    let _ = writeln!(output, "{:-<name_width$}  {:-<ip_width$}  {:-<5}", "", "", "");

    for host in hosts {
        let _ = writeln!(
            output,
            "{:<name_width$}  {:<ip_width$}  {}",
            host.hostname, host.address, host.port
        );
    }

    output.trim_end().to_string()
}

/// Format hosts as JSON string
///
/// # Errors
///
/// Returns `CliError::Config` if JSON serialization fails.
pub fn format_json(hosts: &[HostEntry]) -> Result<String, CliError> {
    serde_json::to_string_pretty(hosts)
        .map_err(|e| CliError::Config(format!("Failed to serialize to JSON: {e}")))
}

/// Format hosts as CSV string in the host list layout
#[must_use]
pub fn format_csv(hosts: &[HostEntry]) -> String {
    let mut output = String::from("hostname,ip,port\n");
    for host in hosts {
        let _ = writeln!(
            output,
            "{},{},{}",
            escape_csv_field(&host.hostname),
            escape_csv_field(&host.address),
            host.port
        );
    }
    output.trim_end().to_string()
}
