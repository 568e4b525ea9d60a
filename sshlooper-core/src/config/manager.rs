//! Locates, loads and saves the settings file

use std::path::{Path, PathBuf};

use super::settings::Settings;
use crate::error::{ConfigError, ConfigResult};

/// Environment variable that overrides the configuration directory
pub const CONFIG_DIR_ENV: &str = "SSHLOOPER_CONFIG_DIR";

/// Name of the settings file inside the configuration directory
pub const SETTINGS_FILE: &str = "settings.toml";

/// Manages the configuration directory
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Creates a manager for the default configuration directory
    ///
    /// `SSHLOOPER_CONFIG_DIR` wins over the platform config directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoConfigDir` if neither is available.
    pub fn new() -> ConfigResult<Self> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV)
            && !dir.trim().is_empty()
        {
            return Ok(Self::with_config_dir(expand(&dir)));
        }

        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(Self::with_config_dir(base.join("sshlooper")))
    }

    /// Creates a manager rooted at an explicit directory
    #[must_use]
    pub const fn with_config_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Returns the configuration directory
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Returns the settings file path
    #[must_use]
    pub fn settings_path(&self) -> PathBuf {
        self.config_dir.join(SETTINGS_FILE)
    }

    /// Loads settings; a missing file yields defaults
    ///
    /// Path settings are tilde/env expanded after loading.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML or
    /// fails validation.
    pub fn load_settings(&self) -> ConfigResult<Settings> {
        let path = self.settings_path();
        let _span = tracing::debug_span!(crate::tracing::span_names::CONFIG_LOAD, path = %path.display())
            .entered();

        let mut settings = match std::fs::read_to_string(&path) {
            Ok(text) => toml::from_str::<Settings>(&text)
                .map_err(|e| ConfigError::Parse(format!("{}: {e}", path.display())))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No settings file, using defaults");
                Settings::default()
            }
            Err(source) => return Err(ConfigError::Io { path, source }),
        };

        settings.hosts_file = expand_path(&settings.hosts_file);
        settings.commands_dir = expand_path(&settings.commands_dir);
        settings.log_file = expand_path(&settings.log_file);
        settings.known_hosts = settings.known_hosts.as_deref().map(expand_path);

        settings.validate()?;
        Ok(settings)
    }

    /// Writes settings as TOML, creating the directory if needed
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are invalid or cannot be written.
    pub fn save_settings(&self, settings: &Settings) -> ConfigResult<()> {
        settings.validate()?;

        std::fs::create_dir_all(&self.config_dir).map_err(|source| ConfigError::Io {
            path: self.config_dir.clone(),
            source,
        })?;

        let text = toml::to_string_pretty(settings)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;
        let path = self.settings_path();
        std::fs::write(&path, text).map_err(|source| ConfigError::Io { path, source })
    }
}

fn expand(value: &str) -> PathBuf {
    PathBuf::from(shellexpand::full(value).map_or_else(|_| value.into(), |s| s.into_owned()))
}

fn expand_path(path: &Path) -> PathBuf {
    path.to_str().map_or_else(|| path.to_path_buf(), expand)
}
