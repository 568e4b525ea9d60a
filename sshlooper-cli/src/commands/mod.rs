//! Command handler modules for the CLI.

mod catalog;
mod check;
mod completions;
mod hosts;
mod manpage;
mod run;

use std::path::Path;

use crate::cli::Commands;
use crate::error::CliError;
use crate::format::Palette;

/// Dispatch a CLI command to the appropriate handler.
pub fn dispatch(
    config_path: Option<&Path>,
    quiet: bool,
    palette: Palette,
    command: Commands,
) -> Result<(), CliError> {
    match command {
        Commands::Run(args) => run::cmd_run(config_path, quiet, palette, &args),
        Commands::Catalog { filter, format } => {
            catalog::cmd_commands(config_path, filter.as_deref(), format)
        }
        Commands::Hosts { file, init, format } => {
            hosts::cmd_hosts(config_path, file.as_deref(), init, format)
        }
        Commands::Check { text } => check::cmd_check(config_path, &text, palette),
        Commands::Completions { shell } => completions::cmd_completions(shell),
        Commands::Manpage => manpage::cmd_manpage(),
    }
}
