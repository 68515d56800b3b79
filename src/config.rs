//! Runtime configuration loaded from TOML.
//!
//! Every field has a default, so an absent or partial config file is valid.

use crate::error::Result;
use anyhow::Context;
use serde::Deserialize;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Delay between the last keystroke and the search it triggers.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Upper bound on a single shard load before it is treated as failed.
pub const DEFAULT_LOAD_TIMEOUT_MS: u64 = 5000;

/// Prefix applied to every settings key.
pub const DEFAULT_NAMESPACE: &str = "doxygen_";

/// Sidebar width used when no usable width has been persisted.
pub const DEFAULT_SIDEBAR_WIDTH: u32 = 250;

/// Which settings backend to construct.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SettingsBackend {
    /// Durable key-value file plus an in-memory session tier.
    #[default]
    WebStorage,
    /// Cookie jar with per-cookie expiry.
    Cookies,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Milliseconds to wait after the last keystroke before searching.
    pub debounce_ms: u64,
    /// Milliseconds a shard load may take before it falls back to empty results.
    pub load_timeout_ms: u64,
    /// Namespace prefix for settings keys.
    pub namespace: String,
    pub settings_backend: SettingsBackend,
    /// Where persistent settings are stored. `None` uses the platform data dir.
    pub settings_file: Option<PathBuf>,
    pub default_width: u32,
    /// Use the wider touch-device split bar.
    pub touch: bool,
    /// Documentation root used when no `--docs` flag is given.
    pub docs: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            load_timeout_ms: DEFAULT_LOAD_TIMEOUT_MS,
            namespace: DEFAULT_NAMESPACE.to_string(),
            settings_backend: SettingsBackend::default(),
            settings_file: None,
            default_width: DEFAULT_SIDEBAR_WIDTH,
            touch: false,
            docs: None,
        }
    }
}

impl Config {
    /// Parse a config from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config")
    }

    /// Load a config file. A missing file at the default location yields defaults;
    /// a missing file that was asked for explicitly is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => PathBuf::from(expand_tilde(&path.to_string_lossy()).as_ref()),
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                _ => {
                    tracing::debug!("No config file found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }

    /// Resolved location of the persistent settings file.
    pub fn settings_path(&self) -> PathBuf {
        match &self.settings_file {
            Some(path) => PathBuf::from(expand_tilde(&path.to_string_lossy()).as_ref()),
            None => {
                let file = match self.settings_backend {
                    SettingsBackend::WebStorage => "settings.json",
                    SettingsBackend::Cookies => "cookies.txt",
                };
                dirs::data_dir()
                    .unwrap_or_else(std::env::temp_dir)
                    .join("doxsearch")
                    .join(file)
            }
        }
    }
}

/// `$XDG_CONFIG_HOME/doxsearch/config.toml` or the platform equivalent.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("doxsearch").join("config.toml"))
}

/// Expands tilde (`~`) in a path to the user's home directory.
///
/// - `~/foo` becomes `/home/user/foo`
/// - `~` becomes `/home/user`
/// - Other paths are returned unchanged
pub fn expand_tilde(path: &str) -> Cow<'_, str> {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return Cow::Owned(home.join(stripped).display().to_string());
        }
    } else if path == "~"
        && let Some(home) = dirs::home_dir()
    {
        return Cow::Owned(home.display().to_string());
    }
    Cow::Borrowed(path)
}
