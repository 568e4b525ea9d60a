//! CLI argument parsing types using `clap`.

use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use sshlooper_core::ExportFormat;

/// SSH Looper: run one command on many hosts over SSH
#[derive(Parser)]
#[command(name = "sshlooper")]
#[command(author, version, about = "Run one command on many hosts over SSH")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration directory
    #[arg(short, long, global = true, env = "SSHLOOPER_CONFIG_DIR")]
    pub config: Option<PathBuf>,

    /// Increase output verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        action = clap::ArgAction::SetTrue,
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Write logs to the configured log file instead of stderr
    #[arg(long, global = true)]
    pub log_file: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run a command on every host in the host list
    #[command(about = "Run a catalog or manual command on all hosts")]
    Run(RunArgs),

    /// List the command catalog
    #[command(name = "commands", about = "List commands available in the catalog")]
    Catalog {
        /// Only show commands whose key or text contains this keyword
        #[arg(short, long)]
        filter: Option<String>,

        /// Output format
        #[arg(long, default_value = "table", value_enum)]
        format: OutputFormat,
    },

    /// List hosts from the host list
    #[command(about = "List hosts or create a sample host list")]
    Hosts {
        /// Host list CSV (defaults to the configured file)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Write a sample host list instead of listing
        #[arg(long)]
        init: bool,

        /// Output format
        #[arg(long, default_value = "table", value_enum)]
        format: OutputFormat,
    },

    /// Check a command against the safety filter
    #[command(about = "Check whether a manual command would be allowed")]
    Check {
        /// Command text to check
        text: String,
    },

    /// Generate shell completions
    #[command(about = "Generate shell completion scripts")]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Generate a man page
    #[command(about = "Print the man page in roff format")]
    Manpage,
}

/// Arguments of the `run` command
#[derive(Args)]
#[command(group(ArgGroup::new("what").required(true).args(["command", "manual"])))]
pub struct RunArgs {
    /// Host list CSV (defaults to the configured file)
    #[arg(long)]
    pub hosts: Option<PathBuf>,

    /// Catalog command key, e.g. "POSIX: Disk Usage" (repeatable)
    #[arg(long = "command", value_name = "KEY")]
    pub command: Vec<String>,

    /// Manually typed command; checked by the safety filter
    #[arg(short, long, value_name = "TEXT")]
    pub manual: Option<String>,

    /// Skip the confirmation prompt for manual commands
    #[arg(short, long)]
    pub yes: bool,

    /// Login name (defaults to the configured username)
    #[arg(short, long)]
    pub user: Option<String>,

    /// Maximum number of hosts contacted at once
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Connection setup timeout in seconds
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Ask for the password once for all commands of this run
    #[arg(long)]
    pub remember_password: bool,

    /// Write results to this file or directory
    #[arg(short, long, value_name = "PATH")]
    pub export: Option<PathBuf>,

    /// Export format (defaults to the file extension, then CSV)
    #[arg(long, value_enum)]
    pub format: Option<ExportFormatArg>,
}

/// Output format for listing commands
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Display as formatted table
    Table,
    /// Output as JSON
    Json,
    /// Output as CSV
    Csv,
}

/// Export format options
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ExportFormatArg {
    /// Comma-separated values
    Csv,
    /// JSON array
    Json,
}

impl From<ExportFormatArg> for ExportFormat {
    fn from(arg: ExportFormatArg) -> Self {
        match arg {
            ExportFormatArg::Csv => Self::Csv,
            ExportFormatArg::Json => Self::Json,
        }
    }
}
