//! Durable key-value file plus a transient session tier.

use super::{Retention, SettingsStore};
use crate::error::Result;
use ahash::AHashMap;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredValue {
    value: String,
    /// Unix seconds; `None` never expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<u64>,
}

impl StoredValue {
    fn is_live(&self, now: u64) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }
}

/// Reads check the durable tier first, then the session tier. A write to one tier
/// clears the key from the other, so the last write is always the one read back.
#[derive(Debug, Default)]
pub struct WebStorage {
    /// Backing file for the durable tier; `None` keeps it in memory.
    path: Option<PathBuf>,
    durable: BTreeMap<String, StoredValue>,
    session: AHashMap<String, String>,
}

impl WebStorage {
    /// A store whose durable tier is not backed by a file.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the durable tier at `path`. A missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let durable = match load_file(&path) {
            Ok(durable) => durable,
            Err(e) => {
                tracing::warn!("Ignoring unreadable settings file: {:#}", e);
                BTreeMap::new()
            }
        };
        Self {
            path: Some(path),
            durable,
            session: AHashMap::new(),
        }
    }

    fn save(&mut self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let now = unix_now();
        self.durable.retain(|_, stored| stored.is_live(now));

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        let content =
            serde_json::to_string_pretty(&self.durable).context("Failed to serialize settings")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write settings to {}", path.display()))?;
        Ok(())
    }
}

impl SettingsStore for WebStorage {
    fn get(&self, key: &str) -> Option<String> {
        let now = unix_now();
        self.durable
            .get(key)
            .filter(|stored| stored.is_live(now))
            .map(|stored| stored.value.clone())
            .or_else(|| self.session.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str, retention: Retention) -> Result<()> {
        match retention {
            Retention::Session => {
                self.session.insert(key.to_string(), value.to_string());
                if self.durable.remove(key).is_some() {
                    self.save()?;
                }
                Ok(())
            }
            Retention::Days(_) => {
                self.session.remove(key);
                let expires_at = retention
                    .expires_at(SystemTime::now())
                    .and_then(|at| at.duration_since(UNIX_EPOCH).ok())
                    .map(|d| d.as_secs());
                self.durable.insert(
                    key.to_string(),
                    StoredValue {
                        value: value.to_string(),
                        expires_at,
                    },
                );
                self.save()
            }
            Retention::Erase => self.remove(key),
        }
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.session.remove(key);
        if self.durable.remove(key).is_some() {
            self.save()?;
        }
        Ok(())
    }
}

fn load_file(path: &Path) -> Result<BTreeMap<String, StoredValue>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
