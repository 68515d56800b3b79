//! Shard loading with an append-only cache and shared in-flight fetches.
//!
//! Each shard is fetched at most once per store: concurrent callers await the same
//! future, and the result (success or failure) is kept for the store's lifetime.

use super::locator::ShardRef;
use super::shard::decode_shard;
use crate::error::ShardError;
use crate::types::ResultEntry;
use ahash::AHashMap;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

/// Decoded entries of a shard, or why they are unavailable.
pub type LoadedShard = Result<Arc<[ResultEntry]>, ShardError>;

type SharedShardFuture = Shared<BoxFuture<'static, LoadedShard>>;

/// Where shard text comes from.
pub trait ShardSource: Send + Sync + 'static {
    fn fetch(&self, shard: &ShardRef) -> BoxFuture<'static, Result<String, ShardError>>;
}

/// Reads shards from a results directory on disk.
#[derive(Debug, Clone)]
pub struct FsShardSource {
    dir: PathBuf,
}

impl FsShardSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ShardSource for FsShardSource {
    fn fetch(&self, shard: &ShardRef) -> BoxFuture<'static, Result<String, ShardError>> {
        let path = shard.path_in(&self.dir);
        let file = shard.file_name();
        Box::pin(async move {
            tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| ShardError::Io {
                    file,
                    reason: e.to_string(),
                })
        })
    }
}

pub struct ShardStore {
    source: Arc<dyn ShardSource>,
    timeout: Duration,
    /// Loaded shards. Entries are inserted once and never replaced.
    cache: RwLock<AHashMap<ShardRef, LoadedShard>>,
    /// Fetches in progress, awaited by every caller asking for the same shard.
    in_flight: Mutex<AHashMap<ShardRef, SharedShardFuture>>,
}

impl std::fmt::Debug for ShardStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShardStore")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ShardStore {
    pub fn new(source: Arc<dyn ShardSource>, timeout: Duration) -> Self {
        Self {
            source,
            timeout,
            cache: RwLock::new(AHashMap::new()),
            in_flight: Mutex::new(AHashMap::new()),
        }
    }

    /// Store reading from a results directory.
    pub fn from_dir(dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self::new(Arc::new(FsShardSource::new(dir)), timeout)
    }

    /// Get a shard, fetching it if no earlier call has.
    pub async fn load(&self, shard: &ShardRef) -> LoadedShard {
        if let Some(loaded) = self.cache.read().await.get(shard) {
            tracing::trace!("Shard cache hit for {}", shard);
            return loaded.clone();
        }

        let future = {
            let mut in_flight = self.in_flight.lock().await;
            // A fetch may have finished between the read above and taking this lock.
            if let Some(loaded) = self.cache.read().await.get(shard) {
                return loaded.clone();
            }
            if let Some(future) = in_flight.get(shard) {
                tracing::debug!("Awaiting in-flight load of {}", shard);
                future.clone()
            } else {
                let future = self.fetch(shard.clone()).shared();
                in_flight.insert(shard.clone(), future.clone());
                future
            }
        };

        let loaded = future.await;

        self.cache
            .write()
            .await
            .entry(shard.clone())
            .or_insert_with(|| loaded.clone());
        self.in_flight.lock().await.remove(shard);

        loaded
    }

    /// Cached result for a shard without triggering a fetch.
    pub async fn cached(&self, shard: &ShardRef) -> Option<LoadedShard> {
        self.cache.read().await.get(shard).cloned()
    }

    pub async fn is_loading(&self, shard: &ShardRef) -> bool {
        self.in_flight.lock().await.contains_key(shard)
    }

    fn fetch(&self, shard: ShardRef) -> BoxFuture<'static, LoadedShard> {
        let source = Arc::clone(&self.source);
        let timeout = self.timeout;

        Box::pin(async move {
            let file = shard.file_name();
            tracing::debug!("Loading shard {}", file);

            let text = match tokio::time::timeout(timeout, source.fetch(&shard)).await {
                Ok(Ok(text)) => text,
                Ok(Err(e)) => {
                    tracing::warn!("{}", e);
                    return Err(e);
                }
                Err(_) => {
                    let e = ShardError::Timeout {
                        file,
                        millis: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                    };
                    tracing::warn!("{}", e);
                    return Err(e);
                }
            };

            match decode_shard(&text) {
                Ok(entries) => {
                    tracing::debug!("Loaded shard {}: {} entries", file, entries.len());
                    Ok(Arc::from(entries))
                }
                Err(reason) => {
                    let e = ShardError::Malformed { file, reason };
                    tracing::warn!("{}", e);
                    Err(e)
                }
            }
        })
    }
}
