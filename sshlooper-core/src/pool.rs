//! Worker pool: bounded-concurrency fan-out of one command to many hosts
//!
//! [`WorkerPool::dispatch`] returns as soon as the driver task is spawned.
//! The driver keeps at most `max_threads` host tasks in flight, pushes each
//! result into the [`ResultSink`] as it completes and finally reports a
//! [`DispatchSummary`] through the [`DispatchHandle`].

// Allow precision loss for percentage calculations - acceptable for display purposes
#![allow(clippy::cast_precision_loss)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::{DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_MAX_THREADS, Settings};
use crate::error::{DispatchError, DispatchResult, HostError};
use crate::models::{CommandSpec, Host, HostResult};
use crate::safety::CommandFilter;
use crate::session::RemoteExecutor;
use crate::sink::ResultSink;
use crate::task::{PreparedCommand, execute_on_host};
use crate::tracing::span_names;

/// Outcome counts of a finished dispatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchSummary {
    /// Dispatch identifier, also present in log spans
    pub id: Uuid,
    /// Number of hosts dispatched to
    pub total: usize,
    /// Results without an error
    pub succeeded: usize,
    /// Results with an error
    pub failed: usize,
    /// Wall time from spawn to last result
    pub elapsed: Duration,
}

impl DispatchSummary {
    /// Creates an empty summary
    #[must_use]
    pub const fn new(id: Uuid) -> Self {
        Self {
            id,
            total: 0,
            succeeded: 0,
            failed: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Counts one finished host
    pub fn record(&mut self, success: bool) {
        if success {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.total += 1;
    }

    /// Returns true if every host succeeded
    #[must_use]
    pub const fn all_succeeded(&self) -> bool {
        self.failed == 0
    }

    /// Returns true if any host failed
    #[must_use]
    pub const fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Returns the success rate as a percentage (0.0 to 100.0)
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        (self.succeeded as f64 / self.total as f64) * 100.0
    }

    /// Returns a one-line summary
    #[must_use]
    pub fn summary_string(&self) -> String {
        format!(
            "Total: {}, Succeeded: {}, Failed: {} ({:.1}% success) in {:.1}s",
            self.total,
            self.succeeded,
            self.failed,
            self.success_rate(),
            self.elapsed.as_secs_f64()
        )
    }
}

/// Handle to a running dispatch
///
/// Dropping the handle does not cancel anything; results keep flowing into
/// the sink.
#[derive(Debug)]
pub struct DispatchHandle {
    id: Uuid,
    total: usize,
    join: JoinHandle<DispatchSummary>,
}

impl DispatchHandle {
    /// Dispatch identifier
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Number of hosts dispatched to
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    /// Returns true once every host has reported
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Waits for every host to report
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::PoolFailed` if the driver task panicked.
    pub async fn wait(self) -> DispatchResult<DispatchSummary> {
        self.join
            .await
            .map_err(|e| DispatchError::PoolFailed(e.to_string()))
    }
}

/// Bounded-concurrency scheduler for host tasks
pub struct WorkerPool {
    executor: Arc<dyn RemoteExecutor>,
    max_threads: usize,
    connect_timeout: Duration,
    filter: CommandFilter,
}

impl WorkerPool {
    /// Creates a pool with default limits
    #[must_use]
    pub fn new(executor: Arc<dyn RemoteExecutor>) -> Self {
        Self {
            executor,
            max_threads: DEFAULT_MAX_THREADS,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            filter: CommandFilter::new(),
        }
    }

    /// Creates a pool configured from settings
    #[must_use]
    pub fn from_settings(executor: Arc<dyn RemoteExecutor>, settings: &Settings) -> Self {
        Self::new(executor)
            .max_threads(settings.max_threads)
            .connect_timeout(settings.connect_timeout())
            .filter(CommandFilter::new().with_denied(&settings.denied_commands))
    }

    /// Sets the concurrency limit; zero is treated as one
    #[must_use]
    pub fn max_threads(mut self, max_threads: usize) -> Self {
        self.max_threads = max_threads.max(1);
        self
    }

    /// Sets the connection setup timeout
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the filter applied to manual commands
    #[must_use]
    pub fn filter(mut self, filter: CommandFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Gets the concurrency limit
    #[must_use]
    pub const fn get_max_threads(&self) -> usize {
        self.max_threads
    }

    /// Gets the connection setup timeout
    #[must_use]
    pub const fn get_connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Gets the manual command filter
    #[must_use]
    pub const fn get_filter(&self) -> &CommandFilter {
        &self.filter
    }

    /// Safety-checks an operator-typed command, then dispatches it
    ///
    /// Manual commands have no extraction pattern, so every output line is
    /// collected.
    ///
    /// # Errors
    ///
    /// Returns `CommandRejected` before any host is contacted if the
    /// command contains a denied substring, plus the errors of
    /// [`Self::dispatch`].
    pub fn run_manual(
        &self,
        hosts: Vec<Host>,
        command: &str,
        sink: ResultSink,
    ) -> DispatchResult<DispatchHandle> {
        self.filter.check(command)?;
        self.dispatch(hosts, CommandSpec::manual(command), sink)
    }

    /// Dispatches a catalog command; catalog commands are not filtered
    ///
    /// # Errors
    ///
    /// See [`Self::dispatch`].
    pub fn run_catalog(
        &self,
        hosts: Vec<Host>,
        spec: CommandSpec,
        sink: ResultSink,
    ) -> DispatchResult<DispatchHandle> {
        self.dispatch(hosts, spec, sink)
    }

    /// Starts one task per host and returns immediately
    ///
    /// Every host yields exactly one result in `sink`, in completion order.
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `NoHosts` for an empty host list and `NoRuntime` outside a
    /// tokio runtime.
    pub fn dispatch(
        &self,
        hosts: Vec<Host>,
        spec: CommandSpec,
        sink: ResultSink,
    ) -> DispatchResult<DispatchHandle> {
        if hosts.is_empty() {
            return Err(DispatchError::NoHosts);
        }
        let runtime = Handle::try_current().map_err(|e| DispatchError::NoRuntime(e.to_string()))?;

        let id = Uuid::new_v4();
        let total = hosts.len();
        let max_threads = self.max_threads;
        let connect_timeout = self.connect_timeout;
        let executor = Arc::clone(&self.executor);
        let prepared = Arc::new(PreparedCommand::new(spec));
        let hosts: Vec<Arc<Host>> = hosts.into_iter().map(Arc::new).collect();

        let span = tracing::info_span!(
            span_names::DISPATCH,
            dispatch_id = %id,
            host_count = total,
        );

        let driver = async move {
            let started = Instant::now();
            tracing::info!(
                command = %prepared.spec.command,
                max_threads,
                "Dispatch started"
            );

            let mut summary = stream::iter(hosts)
                .map(|host| {
                    let executor = Arc::clone(&executor);
                    let prepared = Arc::clone(&prepared);
                    let sink = sink.clone();
                    run_host(executor, host, prepared, connect_timeout, sink)
                })
                .buffer_unordered(max_threads)
                .fold(DispatchSummary::new(id), |mut summary, success| async move {
                    summary.record(success);
                    summary
                })
                .await;

            summary.elapsed = started.elapsed();
            tracing::info!(
                succeeded = summary.succeeded,
                failed = summary.failed,
                duration_ms = u64::try_from(summary.elapsed.as_millis()).unwrap_or(u64::MAX),
                "Dispatch finished"
            );
            summary
        }
        .instrument(span);

        Ok(DispatchHandle {
            id,
            total,
            join: runtime.spawn(driver),
        })
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("max_threads", &self.max_threads)
            .field("connect_timeout", &self.connect_timeout)
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}

/// Runs one host on its own task so a panic stays contained
async fn run_host(
    executor: Arc<dyn RemoteExecutor>,
    host: Arc<Host>,
    prepared: Arc<PreparedCommand>,
    connect_timeout: Duration,
    sink: ResultSink,
) -> bool {
    let fallback = HostResult::for_host(&host);
    let span = tracing::debug_span!(span_names::HOST_TASK, address = %host.address);

    let task = tokio::spawn(
        async move { execute_on_host(executor.as_ref(), host, &prepared, connect_timeout).await }
            .instrument(span),
    );

    let result = match task.await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(address = %fallback.address, error = %e, "Host task aborted");
            let mut result = fallback;
            result.error = HostError::TaskFailed(e.to_string()).to_string();
            result
        }
    };

    let success = result.is_success();
    sink.push(result);
    success
}
