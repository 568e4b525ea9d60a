//! SSH transport built on libssh2
//!
//! Each call opens a new TCP connection, authenticates with the host's
//! password, runs one command on a fresh channel and disconnects. libssh2 is
//! blocking, so the work runs on tokio's blocking pool.
//!
//! Host keys are trusted on first use: unknown keys are accepted without
//! being recorded. This is weaker than pinned verification. When a
//! known_hosts file is configured, a key that contradicts a recorded entry
//! is rejected.

use std::io::Read;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use ssh2::{CheckResult, ErrorCode, HashType, KnownHostFileKind, Session};

use super::{CommandOutput, RemoteExecutor, SessionError, SessionResult};
use crate::models::Host;

/// libssh2's `LIBSSH2_ERROR_TIMEOUT`
const LIBSSH2_ERROR_TIMEOUT: i32 = -9;

/// Exit status reported when the server sends none
const UNKNOWN_EXIT_STATUS: i32 = -1;

/// Password-authenticated SSH executor
#[derive(Debug, Clone, Default)]
pub struct SshExecutor {
    known_hosts: Option<PathBuf>,
}

impl SshExecutor {
    /// Creates an executor that accepts any host key
    #[must_use]
    pub const fn new() -> Self {
        Self { known_hosts: None }
    }

    /// Rejects host keys that contradict entries in `path`
    #[must_use]
    pub fn with_known_hosts(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts = Some(path.into());
        self
    }

    /// Returns the configured known_hosts file
    #[must_use]
    pub fn known_hosts(&self) -> Option<&Path> {
        self.known_hosts.as_deref()
    }
}

#[async_trait]
impl RemoteExecutor for SshExecutor {
    async fn execute(
        &self,
        host: Arc<Host>,
        command: &str,
        connect_timeout: Duration,
    ) -> SessionResult<CommandOutput> {
        let command = command.to_string();
        let known_hosts = self.known_hosts.clone();

        tokio::task::spawn_blocking(move || {
            let session = connect(&host, connect_timeout, known_hosts.as_deref())?;
            session.run(&command)
        })
        .await
        .map_err(|e| SessionError::Protocol(format!("session worker failed: {e}")))?
    }
}

/// An authenticated session that disconnects when dropped
struct SessionGuard {
    session: Session,
    endpoint: String,
}

impl SessionGuard {
    fn run(&self, command: &str) -> SessionResult<CommandOutput> {
        tracing::debug!(endpoint = %self.endpoint, command, "Executing command");

        let mut channel = self
            .session
            .channel_session()
            .map_err(|e| SessionError::Protocol(format!("failed to open channel: {}", e.message())))?;
        channel
            .exec(command)
            .map_err(|e| SessionError::Protocol(format!("failed to execute: {}", e.message())))?;

        let mut stdout = Vec::new();
        channel
            .read_to_end(&mut stdout)
            .map_err(|e| SessionError::Protocol(format!("failed to read stdout: {e}")))?;

        let mut stderr = Vec::new();
        channel
            .stderr()
            .read_to_end(&mut stderr)
            .map_err(|e| SessionError::Protocol(format!("failed to read stderr: {e}")))?;

        if let Err(e) = channel.wait_close() {
            tracing::debug!(endpoint = %self.endpoint, error = %e, "Channel did not close cleanly");
        }
        let exit_status = channel.exit_status().unwrap_or(UNKNOWN_EXIT_STATUS);

        let output = CommandOutput {
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            exit_status,
        };

        tracing::debug!(
            endpoint = %self.endpoint,
            exit_status,
            stdout = %output.stdout,
            "Raw output received"
        );

        Ok(output)
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if let Err(e) = self.session.disconnect(None, "sshlooper: done", None) {
            tracing::debug!(endpoint = %self.endpoint, error = %e, "Failed to close SSH connection");
        }
    }
}

fn connect(
    host: &Host,
    connect_timeout: Duration,
    known_hosts: Option<&Path>,
) -> SessionResult<SessionGuard> {
    let endpoint = host.endpoint();
    tracing::debug!(
        endpoint = %endpoint,
        username = %host.username,
        "Connecting"
    );

    let addr = resolve(host)?;
    let tcp = TcpStream::connect_timeout(&addr, connect_timeout).map_err(|e| {
        if e.kind() == std::io::ErrorKind::TimedOut {
            timed_out(connect_timeout)
        } else {
            SessionError::Connectivity(format!("{endpoint}: {e}"))
        }
    })?;

    let mut session = Session::new()
        .map_err(|e| SessionError::Protocol(format!("failed to create session: {}", e.message())))?;
    session.set_timeout(timeout_ms(connect_timeout));
    session.set_tcp_stream(tcp);

    // From here on the guard owns the socket and disconnects on every path
    let mut guard = SessionGuard { session, endpoint };

    guard.session.handshake().map_err(|e| {
        if e.code() == ErrorCode::Session(LIBSSH2_ERROR_TIMEOUT) {
            timed_out(connect_timeout)
        } else {
            SessionError::Protocol(format!("handshake failed: {}", e.message()))
        }
    })?;

    verify_host_key(&guard.session, host, known_hosts)?;

    guard
        .session
        .userauth_password(&host.username, host.credential.expose_secret())
        .map_err(|e| {
            if e.code() == ErrorCode::Session(LIBSSH2_ERROR_TIMEOUT) {
                timed_out(connect_timeout)
            } else {
                SessionError::Authentication(e.message().to_string())
            }
        })?;

    if !guard.session.authenticated() {
        return Err(SessionError::Authentication(
            "server did not accept the credentials".to_string(),
        ));
    }

    // Command execution has no timeout
    guard.session.set_timeout(0);

    Ok(guard)
}

fn resolve(host: &Host) -> SessionResult<SocketAddr> {
    (host.address.as_str(), host.port)
        .to_socket_addrs()
        .map_err(|e| SessionError::Connectivity(format!("cannot resolve {}: {e}", host.address)))?
        .next()
        .ok_or_else(|| SessionError::Connectivity(format!("no address for {}", host.address)))
}

fn verify_host_key(session: &Session, host: &Host, known_hosts: Option<&Path>) -> SessionResult<()> {
    let Some((key, _)) = session.host_key() else {
        return Err(SessionError::Protocol(
            "server did not present a host key".to_string(),
        ));
    };

    if let Some(hash) = session.host_key_hash(HashType::Sha256) {
        tracing::debug!(
            address = %host.address,
            fingerprint = %fingerprint(hash),
            "Host key presented"
        );
    }

    let Some(path) = known_hosts else {
        return Ok(());
    };

    let mut known = session
        .known_hosts()
        .map_err(|e| SessionError::Protocol(format!("known_hosts unavailable: {}", e.message())))?;
    if let Err(e) = known.read_file(path, KnownHostFileKind::OpenSSH) {
        tracing::debug!(path = %path.display(), error = %e, "known_hosts not readable, accepting key");
        return Ok(());
    }

    match known.check_port(&host.address, host.port, key) {
        CheckResult::Match => Ok(()),
        CheckResult::NotFound => {
            tracing::debug!(address = %host.address, "Unknown host key accepted on first use");
            Ok(())
        }
        CheckResult::Mismatch => Err(SessionError::Protocol(format!(
            "host key mismatch for {}",
            host.address
        ))),
        CheckResult::Failure => {
            tracing::warn!(address = %host.address, "known_hosts lookup failed, accepting key");
            Ok(())
        }
    }
}

fn fingerprint(hash: &[u8]) -> String {
    hash.iter()
        .map(|byte| format!("{byte:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}

fn timed_out(connect_timeout: Duration) -> SessionError {
    SessionError::Connectivity(format!(
        "timed out after {}s",
        connect_timeout.as_secs()
    ))
}

fn timeout_ms(timeout: Duration) -> u32 {
    u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX)
}
