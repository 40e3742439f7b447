//! Cache storage.
//!
//! `CacheStore` is the seam between the cache-aside services and whatever
//! holds the bytes; `MemoryStore` is the in-process implementation. Values
//! are opaque serialized blobs at this level; the service layer owns the
//! logical type behind each key.

use std::collections::VecDeque;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bytes::Bytes;
use lru::LruCache;
use thiserror::Error;

use super::config::CacheConfig;
use super::lock::rw_write;

const SOURCE: &str = "cache::store";

/// Store-level failure. Never surfaced to API callers: the service layer
/// absorbs it and falls through to the repository.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache store unavailable: {0}")]
    Unavailable(String),
    #[error("cache store timed out")]
    Timeout,
}

/// Get/set/delete over opaque blobs with a uniform write-time TTL.
///
/// `get` of an absent or expired key is `Ok(None)`, never an error.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError>;

    async fn set(&self, key: &str, value: Bytes) -> Result<(), CacheError>;

    async fn delete(&self, keys: &[String]) -> Result<(), CacheError>;

    /// Delete every key starting with `prefix`; returns how many were
    /// removed. Used for cascade invalidation of a deleted subtree.
    async fn delete_by_prefix(&self, prefix: &str) -> Result<u64, CacheError>;

    async fn flush_all(&self) -> Result<(), CacheError>;
}

struct Entry {
    value: Bytes,
    expires_at: Instant,
}

/// In-process store: bounded LRU map with lazily enforced expiry.
///
/// Expired entries read as misses and are dropped on the read that finds
/// them; LRU eviction bounds residency between reads.
pub struct MemoryStore {
    entries: RwLock<LruCache<String, Entry>>,
    ttl: Duration,
}

impl MemoryStore {
    pub fn new(config: &CacheConfig) -> Self {
        Self::with_ttl(config, config.ttl())
    }

    /// Construct with an explicit TTL, bypassing the configured one. Handy
    /// when exercising expiry behavior.
    pub fn with_ttl(config: &CacheConfig, ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(config.max_entries_non_zero())),
            ttl,
        }
    }

    /// Number of resident entries, counting ones past their TTL that no
    /// read has evicted yet.
    pub fn len(&self) -> usize {
        rw_write(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Bytes>, CacheError> {
        let mut entries = rw_write(&self.entries, SOURCE, "get");
        let expired = match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => {
                return Ok(Some(entry.value.clone()));
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: Bytes) -> Result<(), CacheError> {
        let entry = Entry {
            value,
            expires_at: Instant::now() + self.ttl,
        };
        rw_write(&self.entries, SOURCE, "set").put(key.to_string(), entry);
        Ok(())
    }

    async fn delete(&self, keys: &[String]) -> Result<(), CacheError> {
        let mut entries = rw_write(&self.entries, SOURCE, "delete");
        for key in keys {
            entries.pop(key);
        }
        Ok(())
    }

    async fn delete_by_prefix(&self, prefix: &str) -> Result<u64, CacheError> {
        let mut entries = rw_write(&self.entries, SOURCE, "delete_by_prefix");
        let matching: VecDeque<String> = entries
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect();
        let count = matching.len() as u64;
        for key in matching {
            entries.pop(&key);
        }
        Ok(count)
    }

    async fn flush_all(&self) -> Result<(), CacheError> {
        rw_write(&self.entries, SOURCE, "flush_all").clear();
        Ok(())
    }
}
