//! In-memory query cache with per-entry freshness windows.
//!
//! This module provides an API-agnostic caching mechanism that:
//! - Stores JSON-serializable values under composite query keys
//! - Records when each value was fetched and how long it stays fresh
//! - Never evicts: stale entries are only eligible for re-fetch
//! - Lets the storage backend be swapped, e.g. for a counting test double

mod layer;
mod storage;
mod traits;

pub use layer::CacheLayer;
pub use storage::MemoryStorage;
pub use traits::{CacheResult, QueryKey};
