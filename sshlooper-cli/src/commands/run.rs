//! Run command: one command on every host of the host list.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use sshlooper_core::config::Settings;
use sshlooper_core::{
    CommandCatalog, CommandFilter, CommandSpec, CredentialHolder, Credentials, DispatchError,
    DispatchSummary, Drained, ExportFormat, Host, HostResult, HostStatus, SshExecutor,
    WorkerPool, default_file_name, load_hosts_csv, merge_results, result_channel, write_export,
};

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::format::{Palette, indent_lines};
use crate::util::{confirm, load_settings, read_password};

/// One command to fan out
struct Job {
    label: String,
    spec: CommandSpec,
    manual: bool,
}

/// Run command handler
#[allow(clippy::too_many_lines)]
pub fn cmd_run(
    config_path: Option<&Path>,
    quiet: bool,
    palette: Palette,
    args: &RunArgs,
) -> Result<(), CliError> {
    let settings = load_settings(config_path)?;

    let hosts_path = args.hosts.as_deref().unwrap_or(&settings.hosts_file);
    let list = load_hosts_csv(hosts_path)?;
    for skipped in &list.skipped {
        eprintln!(
            "Warning: {} line {}: {}",
            hosts_path.display(),
            skipped.line,
            skipped.reason
        );
    }
    if list.is_empty() {
        return Err(DispatchError::NoHosts.into());
    }

    let filter = CommandFilter::new().with_denied(&settings.denied_commands);
    let jobs = build_jobs(args, &settings, &filter)?;

    if let Some(manual) = &args.manual {
        let question = format!("Run '{manual}' on {} hosts?", list.len());
        if !args.yes && !confirm(&question)? {
            eprintln!("Aborted.");
            return Ok(());
        }
    }

    let pool = build_pool(args, &settings, filter);
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::Dispatch(format!("Failed to create runtime: {e}")))?;
    let _guard = runtime.enter();

    let username = args
        .user
        .clone()
        .unwrap_or_else(|| settings.default_username.clone());
    let mut holder = CredentialHolder::new(args.remember_password);
    let mut total = 0;
    let mut failed = 0;

    for (index, job) in jobs.iter().enumerate() {
        let credentials = holder.resolve(|| {
            read_password(&username).map(|password| Credentials {
                username: username.clone(),
                password,
            })
        })?;
        if !credentials.is_complete() {
            return Err(DispatchError::MissingCredentials(
                "username and password are required".to_string(),
            )
            .into());
        }

        let hosts: Vec<Host> = list
            .hosts
            .iter()
            .map(|entry| Host::from_entry(entry, &credentials))
            .collect();

        if !quiet {
            println!(
                "{}Running '{}' on {} hosts ({} at a time){}",
                palette.cyan,
                job.label,
                hosts.len(),
                pool.get_max_threads(),
                palette.reset
            );
        }

        let (sink, mut drain) = result_channel();
        let handle = if job.manual {
            pool.run_manual(hosts, &job.spec.command, sink)?
        } else {
            pool.run_catalog(hosts, job.spec.clone(), sink)?
        };

        let mut results = Vec::with_capacity(handle.total());
        loop {
            match drain.try_pop() {
                Drained::Result(result) => {
                    if !quiet {
                        println!("{}", format_result_line(&result, palette));
                    }
                    results.push(*result);
                }
                Drained::Empty => std::thread::sleep(settings.poll_interval()),
                Drained::Closed => break,
            }
        }

        let summary = runtime.block_on(handle.wait())?;
        if !quiet {
            print_summary(&summary, palette);
        }
        total += summary.total;
        failed += summary.failed;

        if let Some(base) = &args.export {
            let format = args
                .format
                .map(ExportFormat::from)
                .or_else(|| ExportFormat::from_path(base))
                .unwrap_or_default();
            let path = export_path(base, format, index, jobs.len());
            let records = merge_results(&list.hosts, &results);
            write_export(&path, format, &records)?;
            if !quiet {
                println!("Results written to {}", path.display());
            }
        }
    }

    if failed > 0 {
        return Err(CliError::HostsFailed(format!(
            "{failed} of {total} host results reported errors"
        )));
    }
    Ok(())
}

/// Resolves catalog keys and safety-checks the manual command
fn build_jobs(
    args: &RunArgs,
    settings: &Settings,
    filter: &CommandFilter,
) -> Result<Vec<Job>, CliError> {
    if let Some(manual) = &args.manual {
        filter.check(manual)?;
        return Ok(vec![Job {
            label: manual.clone(),
            spec: CommandSpec::manual(manual.as_str()),
            manual: true,
        }]);
    }

    let catalog = CommandCatalog::load_dir(&settings.commands_dir)?;
    for skipped in &catalog.skipped {
        tracing::warn!(path = %skipped.path.display(), reason = %skipped.reason, "Catalog file skipped");
    }

    args.command
        .iter()
        .map(|key| {
            catalog
                .find(key)
                .map(|entry| Job {
                    label: entry.key.clone(),
                    spec: entry.spec.clone(),
                    manual: false,
                })
                .ok_or_else(|| CliError::CommandNotFound(key.clone()))
        })
        .collect()
}

fn build_pool(args: &RunArgs, settings: &Settings, filter: CommandFilter) -> WorkerPool {
    let executor = match &settings.known_hosts {
        Some(path) => SshExecutor::new().with_known_hosts(path),
        None => SshExecutor::new(),
    };

    let mut pool = WorkerPool::from_settings(Arc::new(executor), settings).filter(filter);
    if let Some(threads) = args.threads {
        pool = pool.max_threads(threads);
    }
    if let Some(secs) = args.timeout {
        pool = pool.connect_timeout(Duration::from_secs(secs));
    }
    pool
}

/// Formats one host result as it arrives
fn format_result_line(result: &HostResult, palette: Palette) -> String {
    let (mark, color) = match result.status() {
        HostStatus::Error => ("✗", palette.red),
        _ if result.is_empty_output() => ("!", palette.yellow),
        _ => ("✓", palette.green),
    };

    let mut line = format!(
        "{color}{mark}{reset} {bold}{name}{reset} ({address}:{port})",
        reset = palette.reset,
        bold = palette.bold,
        name = result.hostname,
        address = result.address,
        port = result.port,
    );

    if !result.error.is_empty() {
        let _ = write!(line, " {}{}{}", palette.red, result.error, palette.reset);
    }
    if result.output.contains('\n') {
        line.push('\n');
        line.push_str(&indent_lines(&result.output, "    "));
    } else if !result.output.is_empty() {
        line.push_str(": ");
        line.push_str(&result.output);
    }
    line
}

fn print_summary(summary: &DispatchSummary, palette: Palette) {
    let color = if summary.all_succeeded() {
        palette.green
    } else {
        palette.red
    };
    println!("{color}{}{}", summary.summary_string(), palette.reset);
}

/// Picks the export file for job `index` of `job_count`
///
/// A directory gets a timestamped file name; several jobs get `_N` suffixes.
fn export_path(base: &Path, format: ExportFormat, index: usize, job_count: usize) -> PathBuf {
    let path = if base.is_dir() {
        base.join(default_file_name(format, Local::now()))
    } else {
        base.to_path_buf()
    };

    if job_count <= 1 {
        return path;
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}_{}.{}", index + 1, ext.to_string_lossy()),
        None => format!("{stem}_{}", index + 1),
    };
    path.with_file_name(name)
}
