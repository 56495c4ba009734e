//! Cache layer that orchestrates caching logic with network fetching.

use chrono::Duration;
use color_eyre::{eyre::eyre, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

use super::storage::{CacheStorage, CachedEntry};
use super::traits::{CacheResult, QueryKey};

/// Cache layer that manages caching logic and network fetching.
///
/// Cloning is cheap; clones share the same storage.
#[derive(Clone)]
pub struct CacheLayer {
  storage: Arc<dyn CacheStorage>,
  /// Default freshness window for values stored through this layer
  stale_time: Duration,
}

impl CacheLayer {
  /// Create a new cache layer with the given storage backend.
  pub fn new(storage: Arc<dyn CacheStorage>) -> Self {
    Self {
      storage,
      stale_time: Duration::minutes(5),
    }
  }

  /// Set the default stale time for cached data.
  pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
    self.stale_time = stale_time;
    self
  }

  /// Get a value only if it is still fresh.
  pub fn get<T: DeserializeOwned>(&self, key: &impl QueryKey) -> Result<Option<T>> {
    match self.storage.get_entry(&key.cache_hash())? {
      Some(entry) if entry.is_fresh() => decode(key, entry).map(Some),
      _ => Ok(None),
    }
  }

  /// Get a value regardless of freshness.
  ///
  /// For rendering what is already known; never use this to decide whether
  /// to fetch.
  pub fn peek<T: DeserializeOwned>(&self, key: &impl QueryKey) -> Result<Option<T>> {
    self
      .storage
      .get_entry(&key.cache_hash())?
      .map(|entry| decode(key, entry))
      .transpose()
  }

  /// Store a value with the layer's default stale time.
  pub fn set<T: Serialize>(&self, key: &impl QueryKey, value: &T) -> Result<()> {
    self.set_with_stale_time(key, value, self.stale_time)
  }

  /// Store a value with an explicit stale time.
  pub fn set_with_stale_time<T: Serialize>(
    &self,
    key: &impl QueryKey,
    value: &T,
    stale_time: Duration,
  ) -> Result<()> {
    let value = serde_json::to_value(value)
      .map_err(|e| eyre!("Failed to serialize {}: {}", key.description(), e))?;
    self.storage.store_entry(&key.cache_hash(), value, stale_time)
  }

  /// Fetch a single value with a cache-first strategy.
  ///
  /// 1. Check cache - if fresh, return immediately
  /// 2. If stale/missing, fetch from network
  /// 3. Store the fetched value; failures leave the cache untouched
  pub async fn fetch_one<T, F, Fut>(&self, key: &impl QueryKey, fetcher: F) -> Result<CacheResult<T>>
  where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
  {
    if let Some(data) = self.get(key)? {
      debug!(key = %key.description(), "cache hit");
      return Ok(CacheResult::from_cache(data));
    }

    debug!(key = %key.description(), "cache miss, fetching");
    let data = fetcher().await?;
    self.set(key, &data)?;
    Ok(CacheResult::from_network(data))
  }
}

fn decode<T: DeserializeOwned>(key: &impl QueryKey, entry: CachedEntry) -> Result<T> {
  serde_json::from_value(entry.value)
    .map_err(|e| eyre!("Cached {} has unexpected shape: {}", key.description(), e))
}
