//! `sshlooper` - run one command on many hosts over SSH
//!
//! Provides commands for running catalog or manual commands across a host
//! list, listing the catalog and hosts, checking manual commands against the
//! safety filter and generating shell completions.

mod cli;
mod commands;
mod error;
mod format;
mod util;

use std::io::IsTerminal;

use clap::Parser;
use cli::Cli;
use format::Palette;
use sshlooper_core::config::Settings;
use sshlooper_core::tracing::{TracingConfig, TracingLevel, TracingOutput, init_tracing};

fn main() {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    init_logging(&cli);

    let palette = Palette::new(!cli.no_color && std::io::stdout().is_terminal());
    let result = commands::dispatch(config_path, cli.quiet, palette, cli.command);

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
}

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        TracingLevel::Error
    } else {
        TracingLevel::from_verbosity(cli.verbose)
    };

    let mut config = TracingConfig::new().with_level(level);
    if cli.log_file {
        let log_file = util::load_settings(cli.config.as_deref())
            .map(|settings| settings.log_file)
            .unwrap_or_else(|_| Settings::default().log_file);
        config = config.with_output(TracingOutput::File { path: log_file });
    }
    if let Ok(filter) = std::env::var("SSHLOOPER_LOG") {
        config = config.with_filter(filter);
    }

    if let Err(e) = init_tracing(&config) {
        eprintln!("Warning: logging disabled: {e}");
    }
}
