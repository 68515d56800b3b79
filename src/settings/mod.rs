//! Persisted panel settings (selected search category, sidebar width).
//!
//! Callers see one interface regardless of backend. The backend is picked when the
//! [`Settings`] value is constructed, from configuration, never by probing the
//! environment at call time.

mod cookies;
mod web_storage;

pub use cookies::CookieJar;
pub use web_storage::WebStorage;

use crate::config::{Config, SettingsBackend};
use crate::error::Result;
use std::str::FromStr;
use std::time::{Duration, SystemTime};

/// Retention used by [`Settings::write_setting_default`]: ten years.
pub const DEFAULT_TTL_DAYS: i64 = 10 * 365;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// How long a written value lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Retention {
    /// Kept until the store is dropped.
    Session,
    /// Persisted for this many days.
    Days(u32),
    /// Removed immediately.
    Erase,
}

impl Retention {
    /// `0` is session-scoped, negative erases, positive persists for that many days.
    pub fn from_days(ttl_days: i64) -> Self {
        match ttl_days {
            0 => Self::Session,
            d if d < 0 => Self::Erase,
            d => Self::Days(u32::try_from(d).unwrap_or(u32::MAX)),
        }
    }

    /// Absolute expiry for persisted values.
    pub fn expires_at(self, now: SystemTime) -> Option<SystemTime> {
        match self {
            Self::Days(days) => {
                now.checked_add(Duration::from_secs(u64::from(days) * SECONDS_PER_DAY))
            }
            Self::Session | Self::Erase => None,
        }
    }
}

/// A key-value backend for settings.
pub trait SettingsStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn put(&mut self, key: &str, value: &str, retention: Retention) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Namespaced settings over a chosen backend.
pub struct Settings {
    namespace: String,
    store: Box<dyn SettingsStore>,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl Settings {
    pub fn new(namespace: impl Into<String>, store: Box<dyn SettingsStore>) -> Self {
        Self {
            namespace: namespace.into(),
            store,
        }
    }

    /// Settings that live only in memory.
    pub fn in_memory(namespace: impl Into<String>) -> Self {
        Self::new(namespace, Box::new(WebStorage::in_memory()))
    }

    /// Construct the backend named by the configuration.
    pub fn from_config(config: &Config) -> Self {
        let path = config.settings_path();
        let store: Box<dyn SettingsStore> = match config.settings_backend {
            SettingsBackend::WebStorage => Box::new(WebStorage::open(path)),
            SettingsBackend::Cookies => Box::new(CookieJar::open(path)),
        };
        tracing::debug!(
            "Using {:?} settings backend with namespace '{}'",
            config.settings_backend,
            config.namespace
        );
        Self::new(config.namespace.clone(), store)
    }

    fn key(&self, key: &str) -> String {
        format!("{}{}", self.namespace, key)
    }

    /// Stored value for `key`, or `default` when unset or empty.
    pub fn read_setting(&self, key: &str, default: &str) -> String {
        match self.store.get(&self.key(key)) {
            Some(value) if !value.is_empty() => value,
            _ => default.to_string(),
        }
    }

    /// Stored value parsed as `T`; `default` when unset or malformed.
    pub fn read_parsed<T: FromStr>(&self, key: &str, default: T) -> T {
        let Some(raw) = self.store.get(&self.key(key)) else {
            return default;
        };
        match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::debug!("Ignoring malformed setting {}={:?}", key, raw);
                default
            }
        }
    }

    /// Write `value` for `ttl_days`: `0` for the session, negative to erase.
    pub fn write_setting(&mut self, key: &str, value: &str, ttl_days: i64) -> Result<()> {
        let key = self.key(key);
        match Retention::from_days(ttl_days) {
            Retention::Erase => self.store.remove(&key),
            retention => self.store.put(&key, value, retention),
        }
    }

    /// Write `value` with the default ten-year retention.
    pub fn write_setting_default(&mut self, key: &str, value: &str) -> Result<()> {
        self.write_setting(key, value, DEFAULT_TTL_DAYS)
    }

    pub fn erase_setting(&mut self, key: &str) -> Result<()> {
        let key = self.key(key);
        self.store.remove(&key)
    }
}
