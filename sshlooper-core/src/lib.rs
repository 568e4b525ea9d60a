//! SSH Looper core library
//!
//! Runs one command on many hosts over SSH at once and collects one result
//! per host without letting a slow or failing host hold up the others.
//!
//! # Crate Structure
//!
//! - [`models`] - Hosts, command specs and per-host results
//! - [`safety`] - Deny-list filter for manually typed commands
//! - [`session`] - Remote execution seam and the libssh2 transport
//! - [`extract`] - Regex extraction of a value from command output
//! - [`task`] - One host, one command, one result
//! - [`pool`] - Bounded-concurrency fan-out
//! - [`sink`] - Non-blocking hand-off of results to the consumer
//! - [`inventory`] / [`catalog`] - Host list and command catalog loaders
//! - [`credentials`] - Session credential holder
//! - [`export`] - CSV and JSON result export
//! - [`config`] - Settings persistence

#![warn(missing_docs)]

pub mod catalog;
pub mod config;
pub mod credentials;
pub mod error;
pub mod export;
pub mod extract;
pub mod inventory;
pub mod models;
pub mod pool;
pub mod safety;
pub mod session;
pub mod sink;
pub mod task;
pub mod tracing;

pub use catalog::{CatalogEntry, CommandCatalog, DEFAULT_CATEGORY, SkippedFile};
pub use config::{ConfigManager, Settings};
pub use credentials::{CredentialHolder, Credentials};
pub use error::{
    ConfigError, ConfigResult, DispatchError, DispatchResult, ExportError, ExportResult,
    HostError, LoadError, LoadResult,
};
pub use export::{
    CSV_HEADER, ExportFormat, ExportRecord, default_file_name, merge_results, to_csv, to_json,
    write_export,
};
pub use extract::{ExtractError, ExtractResult, Extractor, extract};
pub use inventory::{HostList, SkippedRow, load_hosts_csv, parse_hosts_csv, write_sample};
pub use models::{
    ACCEPT_ALL_PATTERN, CommandSpec, DEFAULT_SSH_PORT, Host, HostEntry, HostResult, HostStatus,
    PARSE_ERROR_SENTINEL,
};
pub use pool::{DispatchHandle, DispatchSummary, WorkerPool};
pub use safety::{CommandFilter, DEFAULT_DENIED_COMMANDS, approve};
pub use session::{CommandOutput, RemoteExecutor, SessionError, SessionResult, SshExecutor};
pub use sink::{Drained, ResultDrain, ResultSink, result_channel};
pub use task::{PreparedCommand, compose_result, execute_on_host};
pub use tracing::{TracingConfig, TracingError, TracingLevel, TracingOutput, init_tracing};
