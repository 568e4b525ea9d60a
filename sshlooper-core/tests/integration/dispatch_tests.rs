//! End-to-end dispatch through the worker pool with a scripted executor
//!
//! The executor below replaces the network: it answers per address, can be
//! slowed down and records how many calls were in flight at once.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use secrecy::SecretString;
use sshlooper_core::{
    CommandOutput, CommandSpec, DispatchError, Drained, Host, HostResult, PARSE_ERROR_SENTINEL,
    RemoteExecutor, SessionError, SessionResult, WorkerPool, result_channel,
};

#[derive(Default)]
struct ScriptedExecutor {
    replies: HashMap<String, SessionResult<CommandOutput>>,
    delay: Duration,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl ScriptedExecutor {
    fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    fn reply(mut self, address: &str, reply: SessionResult<CommandOutput>) -> Self {
        self.replies.insert(address.to_string(), reply);
        self
    }
}

#[async_trait]
impl RemoteExecutor for ScriptedExecutor {
    async fn execute(
        &self,
        host: Arc<Host>,
        _command: &str,
        _connect_timeout: Duration,
    ) -> SessionResult<CommandOutput> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.replies
            .get(&host.address)
            .cloned()
            .unwrap_or_else(|| Ok(CommandOutput::new(format!("Uptime: {} days", host.port), "", 0)))
    }
}

fn host(i: usize) -> Host {
    Host::new(
        format!("node{i}"),
        format!("10.1.0.{i}"),
        22,
        "ops",
        SecretString::from("secret".to_string()),
    )
}

fn hosts(n: usize) -> Vec<Host> {
    (1..=n).map(host).collect()
}

async fn collect(
    pool: &WorkerPool,
    hosts: Vec<Host>,
    spec: CommandSpec,
) -> (Vec<HostResult>, sshlooper_core::DispatchSummary) {
    let (sink, mut drain) = result_channel();
    let handle = pool.dispatch(hosts, spec, sink).expect("dispatch should start");
    let summary = handle.wait().await.expect("pool should finish");

    let mut results = Vec::new();
    while let Some(result) = drain.recv().await {
        results.push(result);
    }
    (results, summary)
}

#[tokio::test]
async fn every_host_yields_exactly_one_result() {
    let executor = Arc::new(
        ScriptedExecutor::default()
            .reply(
                "10.1.0.2",
                Err(SessionError::Connectivity("timed out after 10s".into())),
            )
            .reply(
                "10.1.0.4",
                Err(SessionError::Authentication("denied".into())),
            )
            .reply("10.1.0.5", Ok(CommandOutput::new("", "", 0))),
    );
    let pool = WorkerPool::new(executor.clone()).max_threads(3);

    let input = hosts(12);
    let expected: HashSet<String> = input.iter().map(|h| h.address.clone()).collect();

    let (results, summary) = collect(&pool, input, CommandSpec::new("uptime", "Uptime: (.+)")).await;

    let seen: HashSet<String> = results.iter().map(|r| r.address.clone()).collect();
    assert_eq!(results.len(), 12);
    assert_eq!(seen, expected);
    assert_eq!(summary.total, 12);
    assert_eq!(summary.failed, 2);
    assert_eq!(executor.calls.load(Ordering::SeqCst), 12);

    let by_address: HashMap<&str, &HostResult> =
        results.iter().map(|r| (r.address.as_str(), r)).collect();
    assert_eq!(by_address["10.1.0.1"].output, "22 days");
    assert_eq!(
        by_address["10.1.0.2"].error,
        "Connection failed: timed out after 10s"
    );
    assert!(by_address["10.1.0.2"].output.is_empty());
    assert_eq!(by_address["10.1.0.4"].error, "Authentication failed: denied");
    assert_eq!(by_address["10.1.0.5"].output, PARSE_ERROR_SENTINEL);
}

#[tokio::test]
async fn incomplete_hosts_are_reported_without_connecting() {
    let executor = Arc::new(ScriptedExecutor::default());
    let pool = WorkerPool::new(executor.clone());

    let mut list = hosts(3);
    list[1].username = String::new();
    list[1].credential = SecretString::from(String::new());

    let (results, summary) = collect(&pool, list, CommandSpec::manual("uptime")).await;

    assert_eq!(results.len(), 3);
    assert_eq!(summary.failed, 1);
    assert_eq!(executor.calls.load(Ordering::SeqCst), 2);

    let skipped = results.iter().find(|r| r.address == "10.1.0.2").unwrap();
    assert_eq!(skipped.error, "missing required fields: username, credential");
}

#[tokio::test]
async fn denied_manual_command_contacts_no_host() {
    let executor = Arc::new(ScriptedExecutor::default());
    let pool = WorkerPool::new(executor.clone());
    let (sink, mut drain) = result_channel();

    let err = pool.run_manual(hosts(4), "REBOOT now", sink).unwrap_err();

    assert!(matches!(err, DispatchError::CommandRejected { ref word } if word == "reboot"));
    assert_eq!(executor.calls.load(Ordering::SeqCst), 0);
    assert_eq!(drain.try_pop(), Drained::Closed);
}

#[tokio::test]
async fn catalog_commands_bypass_the_filter() {
    let executor = Arc::new(ScriptedExecutor::default());
    let pool = WorkerPool::new(executor.clone());
    let (sink, _drain) = result_channel();

    let spec = CommandSpec::new("shutdown -c", "");
    let summary = pool
        .run_catalog(hosts(2), spec, sink)
        .unwrap()
        .wait()
        .await
        .unwrap();

    assert_eq!(summary.total, 2);
    assert_eq!(executor.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrency_never_exceeds_the_limit() {
    let executor = Arc::new(ScriptedExecutor::with_delay(Duration::from_millis(40)));
    let pool = WorkerPool::new(executor.clone()).max_threads(3);

    let (results, _) = collect(&pool, hosts(10), CommandSpec::manual("uptime")).await;

    assert_eq!(results.len(), 10);
    let peak = executor.peak.load(Ordering::SeqCst);
    assert!(peak <= 3, "peak concurrency {peak} exceeded limit");
    assert!(peak > 1, "hosts were not run in parallel");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn try_pop_does_not_wait_for_running_tasks() {
    let executor = Arc::new(ScriptedExecutor::with_delay(Duration::from_millis(300)));
    let pool = WorkerPool::new(executor).max_threads(2);
    let (sink, mut drain) = result_channel();

    let handle = pool
        .dispatch(hosts(2), CommandSpec::manual("uptime"), sink)
        .unwrap();

    let started = std::time::Instant::now();
    assert_eq!(drain.try_pop(), Drained::Empty);
    assert!(started.elapsed() < Duration::from_millis(100));
    assert!(!handle.is_finished());

    handle.wait().await.unwrap();
    assert_eq!(drain.drain().len(), 2);
    assert_eq!(drain.try_pop(), Drained::Closed);
}

#[tokio::test]
async fn dropping_the_handle_does_not_cancel() {
    let executor = Arc::new(ScriptedExecutor::with_delay(Duration::from_millis(20)));
    let pool = WorkerPool::new(executor.clone());
    let (sink, mut drain) = result_channel();

    drop(pool.dispatch(hosts(3), CommandSpec::manual("uptime"), sink).unwrap());

    let mut count = 0;
    while drain.recv().await.is_some() {
        count += 1;
    }
    assert_eq!(count, 3);
    assert_eq!(executor.calls.load(Ordering::SeqCst), 3);
}
