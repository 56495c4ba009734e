//! Cache storage trait and in-memory implementation.

use chrono::{DateTime, Duration, Utc};
use color_eyre::{eyre::eyre, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// A single cached value.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedEntry {
  /// The cached value as JSON
  pub value: Value,
  /// When the value was stored
  pub cached_at: DateTime<Utc>,
  /// How long after `cached_at` the value counts as fresh
  pub stale_time: Duration,
}

impl CachedEntry {
  pub fn new(value: Value, stale_time: Duration) -> Self {
    Self {
      value,
      cached_at: Utc::now(),
      stale_time,
    }
  }

  /// Whether the entry is still inside its freshness window at `now`
  pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
    now - self.cached_at < self.stale_time
  }

  pub fn is_fresh(&self) -> bool {
    self.is_fresh_at(Utc::now())
  }
}

/// Trait for cache storage backends.
///
/// Lookups return entries regardless of freshness; deciding whether an
/// entry may be served is up to the caller.
pub trait CacheStorage: Send + Sync {
  /// Get the entry stored under `key`, fresh or not.
  fn get_entry(&self, key: &str) -> Result<Option<CachedEntry>>;

  /// Store `value` under `key`, replacing any previous entry.
  fn store_entry(&self, key: &str, value: Value, stale_time: Duration) -> Result<()>;
}

/// Process-wide in-memory storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
  entries: Mutex<HashMap<String, CachedEntry>>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }

  #[cfg(test)]
  pub fn len(&self) -> usize {
    self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
  }
}

impl CacheStorage for MemoryStorage {
  fn get_entry(&self, key: &str) -> Result<Option<CachedEntry>> {
    let entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Cache lock poisoned: {}", e))?;
    Ok(entries.get(key).cloned())
  }

  fn store_entry(&self, key: &str, value: Value, stale_time: Duration) -> Result<()> {
    let mut entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Cache lock poisoned: {}", e))?;
    entries.insert(key.to_string(), CachedEntry::new(value, stale_time));
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_store_and_get() {
    let storage = MemoryStorage::new();
    storage
      .store_entry("k", json!({"name": "Tatooine"}), Duration::minutes(10))
      .unwrap();

    let entry = storage.get_entry("k").unwrap().unwrap();
    assert_eq!(entry.value, json!({"name": "Tatooine"}));
    assert!(entry.is_fresh());
    assert_eq!(storage.len(), 1);
  }

  #[test]
  fn test_missing_key() {
    let storage = MemoryStorage::new();
    assert!(storage.get_entry("nope").unwrap().is_none());
  }

  #[test]
  fn test_store_replaces_entry() {
    let storage = MemoryStorage::new();
    storage.store_entry("k", json!(1), Duration::minutes(1)).unwrap();
    storage.store_entry("k", json!(2), Duration::minutes(1)).unwrap();
    assert_eq!(storage.get_entry("k").unwrap().unwrap().value, json!(2));
    assert_eq!(storage.len(), 1);
  }

  #[test]
  fn test_freshness_window() {
    let entry = CachedEntry::new(json!(null), Duration::minutes(10));
    assert!(entry.is_fresh_at(entry.cached_at + Duration::minutes(9)));
    assert!(!entry.is_fresh_at(entry.cached_at + Duration::minutes(10)));
  }

  #[test]
  fn test_zero_stale_time_is_never_fresh() {
    let entry = CachedEntry::new(json!(null), Duration::zero());
    assert!(!entry.is_fresh_at(entry.cached_at));
  }
}
