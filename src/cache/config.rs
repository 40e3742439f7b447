//! Cache configuration.

use std::num::NonZeroUsize;
use std::time::Duration;

use serde::Deserialize;

const DEFAULT_TTL_SECS: u64 = 3600;
const DEFAULT_MAX_ENTRIES: usize = 4096;
const DEFAULT_CONSUME_BATCH_LIMIT: usize = 128;

/// Cache tuning knobs, loaded from `tavolo.toml` / environment.
///
/// Every entry shares one TTL, applied at write time; there is no per-key
/// override. The TTL is a backstop for entries that explicit invalidation
/// never reaches (for example after a partially failed reconciliation run),
/// not the primary consistency mechanism.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Seconds a written entry stays servable.
    pub ttl_secs: u64,
    /// Maximum resident entries before LRU eviction.
    pub max_entries: usize,
    /// Maximum invalidation events folded into one consumption batch.
    pub consume_batch_limit: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: DEFAULT_TTL_SECS,
            max_entries: DEFAULT_MAX_ENTRIES,
            consume_batch_limit: DEFAULT_CONSUME_BATCH_LIMIT,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Entry limit as `NonZeroUsize`, clamping zero to one.
    pub fn max_entries_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.max_entries).unwrap_or(NonZeroUsize::MIN)
    }

    /// Batch limit, clamping zero to one so consumption always progresses.
    pub fn batch_limit(&self) -> usize {
        self.consume_batch_limit.max(1)
    }
}
