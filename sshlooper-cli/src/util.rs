//! Shared utility functions used across command modules.

use std::io::{BufRead, Write};
use std::path::Path;

use secrecy::SecretString;
use sshlooper_core::config::{ConfigManager, Settings};

use crate::error::CliError;

/// Environment variable that supplies the SSH password non-interactively
pub const PASSWORD_ENV: &str = "SSHLOOPER_PASSWORD";

/// Creates a `ConfigManager` using the optional custom config directory
/// from CLI args.
pub fn create_config_manager(config_path: Option<&Path>) -> Result<ConfigManager, CliError> {
    match config_path {
        Some(path) => Ok(ConfigManager::with_config_dir(path.to_path_buf())),
        None => ConfigManager::new()
            .map_err(|e| CliError::Config(format!("Failed to initialize config: {e}"))),
    }
}

/// Loads settings from the configuration directory
pub fn load_settings(config_path: Option<&Path>) -> Result<Settings, CliError> {
    create_config_manager(config_path)?
        .load_settings()
        .map_err(|e| CliError::Config(format!("Failed to load settings: {e}")))
}

/// Reads the SSH password from `SSHLOOPER_PASSWORD` or the terminal
pub fn read_password(username: &str) -> Result<SecretString, CliError> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        return Ok(SecretString::from(password));
    }

    eprint!("Password for '{username}': ");
    rpassword::read_password()
        .map(SecretString::from)
        .map_err(|e| CliError::Config(format!("Failed to read password: {e}")))
}

/// Asks a yes/no question on stderr; anything but `y`/`yes` is a no
pub fn confirm(question: &str) -> Result<bool, CliError> {
    eprint!("{question} [y/N] ");
    std::io::stderr().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
