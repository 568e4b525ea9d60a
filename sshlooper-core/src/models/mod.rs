//! Core data structures: hosts, command specs and per-host results

mod command;
mod host;
mod result;

pub use command::{ACCEPT_ALL_PATTERN, CommandSpec, is_accept_all};
pub use host::{DEFAULT_SSH_PORT, Host, HostEntry};
pub use result::{HostResult, HostStatus, PARSE_ERROR_SENTINEL};
