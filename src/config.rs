use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, instrument, warn};

use crate::shortcuts;

/// Default tracing filter when neither RUST_LOG nor the config file sets one
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Optional settings read from ~/.snapkey/config.json
///
/// Every field may be omitted; getters fill in the defaults. The daemon keeps
/// working with no config file at all.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Overrides the shortcuts file location
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "shortcutsPath")]
    pub shortcuts_path: Option<PathBuf>,
    /// Tracing filter directive, e.g. "debug" or "snapkey=trace"
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "logFilter")]
    pub log_filter: Option<String>,
    /// Start the daemon with placement paused
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "startPaused")]
    pub start_paused: Option<bool>,
}

impl Config {
    /// Returns the configured shortcuts file, falling back to ~/.snapkey/shortcuts.txt
    pub fn get_shortcuts_path(&self) -> PathBuf {
        self.shortcuts_path
            .clone()
            .unwrap_or_else(shortcuts::default_shortcuts_path)
    }

    /// Returns the configured log filter, or DEFAULT_LOG_FILTER if not configured
    ///
    /// RUST_LOG still wins over both; that precedence lives in the logging setup.
    pub fn get_log_filter(&self) -> String {
        self.log_filter
            .clone()
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
    }

    /// Returns whether the daemon should start paused, defaulting to false
    pub fn get_start_paused(&self) -> bool {
        self.start_paused.unwrap_or(false)
    }
}

/// Location of the config file
fn config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".snapkey")
        .join("config.json")
}

/// Load the config file, falling back to defaults on any problem
///
/// A missing file is the normal first-run case. A file that exists but does
/// not parse is reported and ignored rather than aborting the daemon.
#[instrument(name = "load_config")]
pub fn load_config() -> Config {
    let config_path = config_path();

    if !config_path.exists() {
        info!(path = %config_path.display(), "Config file not found, using defaults");
        return Config::default();
    }

    let contents = match std::fs::read_to_string(&config_path) {
        Ok(contents) => contents,
        Err(e) => {
            warn!(
                error = %e,
                path = %config_path.display(),
                "Failed to read config file, using defaults"
            );
            return Config::default();
        }
    };

    match serde_json::from_str::<Config>(&contents) {
        Ok(config) => {
            info!(path = %config_path.display(), "Successfully loaded config");
            config
        }
        Err(e) => {
            warn!(
                error = %e,
                path = %config_path.display(),
                "Failed to parse config JSON, using defaults"
            );
            Config::default()
        }
    }
}
