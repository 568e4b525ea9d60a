//! Execution task: one command on one host, folded into one result
//!
//! A task never fails. Every failure mode ends up in the `error` field of
//! the [`HostResult`] it returns, and the result is produced exactly once.

use std::sync::Arc;
use std::time::Duration;

use crate::error::HostError;
use crate::extract::Extractor;
use crate::models::{CommandSpec, Host, HostResult, PARSE_ERROR_SENTINEL};
use crate::session::{CommandOutput, RemoteExecutor};

/// A command with its extraction pattern compiled once per dispatch
#[derive(Debug, Clone)]
pub struct PreparedCommand {
    /// The command as dispatched
    pub spec: CommandSpec,
    /// Compiled extraction pattern
    pub extractor: Extractor,
}

impl PreparedCommand {
    /// Compiles the extraction pattern of `spec`
    #[must_use]
    pub fn new(spec: CommandSpec) -> Self {
        let extractor = Extractor::new(&spec.pattern);
        Self { spec, extractor }
    }
}

/// Runs `prepared` on `host` and returns the host's result
///
/// Hosts with empty address, port, username or credential are reported
/// without any connection attempt.
pub async fn execute_on_host(
    executor: &dyn RemoteExecutor,
    host: Arc<Host>,
    prepared: &PreparedCommand,
    connect_timeout: Duration,
) -> HostResult {
    let missing = host.missing_fields();
    if !missing.is_empty() {
        let error = HostError::MissingFields(missing);
        tracing::warn!(address = %host.address, error = %error, "Host skipped");
        return HostResult::failed(&host, error.to_string());
    }

    let mut result = HostResult::for_host(&host);

    match executor
        .execute(Arc::clone(&host), &prepared.spec.command, connect_timeout)
        .await
    {
        Ok(output) => compose_result(&mut result, output, &prepared.extractor),
        Err(e) => {
            tracing::warn!(address = %host.address, error = %e, "Session failed");
            result.error = HostError::from(e).to_string();
        }
    }

    result.completed_at = chrono::Utc::now();
    result
}

/// Folds a finished command's output into `result`
///
/// - a non-zero exit or any stderr sets the error first
/// - empty stdout yields [`PARSE_ERROR_SENTINEL`] without extraction
/// - an extraction failure only fills an empty error field
pub fn compose_result(result: &mut HostResult, output: CommandOutput, extractor: &Extractor) {
    result.exit_status = Some(output.exit_status);

    if let Some(exit_error) = HostError::from_exit(&output) {
        tracing::warn!(address = %result.address, error = %exit_error, "Command reported failure");
        result.error = exit_error.to_string();
    }

    if output.stdout.trim().is_empty() {
        result.output = PARSE_ERROR_SENTINEL.to_string();
        return;
    }

    match extractor.extract(&output.stdout) {
        Ok(value) => result.output = value,
        Err(e) => {
            tracing::debug!(address = %result.address, error = %e, "Extraction failed");
            result.output.clear();
            if result.error.is_empty() {
                result.error = HostError::from(e).to_string();
            }
        }
    }
}
