//! Configuration management for SSH Looper
//!
//! This module provides the `ConfigManager` for loading and saving
//! `settings.toml`.

mod manager;
pub mod settings;

pub use manager::{CONFIG_DIR_ENV, ConfigManager, SETTINGS_FILE};
pub use settings::{
    DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_MAX_THREADS, DEFAULT_POLL_INTERVAL_MS, Settings,
};
