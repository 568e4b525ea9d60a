//! Safety filter check command.

use std::path::Path;

use sshlooper_core::CommandFilter;

use crate::error::CliError;
use crate::format::Palette;
use crate::util::load_settings;

/// Check command handler
///
/// Succeeds if `text` would be accepted as a manual command.
pub fn cmd_check(config_path: Option<&Path>, text: &str, palette: Palette) -> Result<(), CliError> {
    let settings = load_settings(config_path)?;
    let filter = CommandFilter::new().with_denied(&settings.denied_commands);

    filter.check(text)?;
    println!("{}✓{} Command allowed", palette.green, palette.reset);
    Ok(())
}
