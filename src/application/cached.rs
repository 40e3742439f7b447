//! Cache-aside read/write helpers shared by the entity services.
//!
//! Every helper absorbs store and codec failures: a broken cache degrades a
//! request to repository latency, never to an error. Failures are counted
//! and logged at `warn`.

use bytes::Bytes;
use metrics::counter;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::cache::CacheStore;

const METRIC_HIT: &str = "tavolo_cache_hit_total";
const METRIC_MISS: &str = "tavolo_cache_miss_total";
const METRIC_ERROR: &str = "tavolo_cache_error_total";

/// Probe `key` and decode the payload. Absent keys, store failures and
/// undecodable payloads all read as a miss.
pub(crate) async fn read_cached<T: DeserializeOwned>(store: &dyn CacheStore, key: &str) -> Option<T> {
    let bytes = match store.get(key).await {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            counter!(METRIC_MISS).increment(1);
            return None;
        }
        Err(err) => {
            counter!(METRIC_ERROR).increment(1);
            warn!(key, error = %err, "Cache read failed; falling through to repository");
            return None;
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(value) => {
            counter!(METRIC_HIT).increment(1);
            Some(value)
        }
        Err(err) => {
            counter!(METRIC_ERROR).increment(1);
            warn!(key, error = %err, "Cached payload undecodable; treating as miss");
            None
        }
    }
}

/// Serialize `value` and write it under `key`, best-effort.
pub(crate) async fn write_cached<T: Serialize>(store: &dyn CacheStore, key: &str, value: &T) {
    let bytes = match serde_json::to_vec(value) {
        Ok(bytes) => Bytes::from(bytes),
        Err(err) => {
            counter!(METRIC_ERROR).increment(1);
            warn!(key, error = %err, "Cache payload could not be encoded");
            return;
        }
    };

    if let Err(err) = store.set(key, bytes).await {
        counter!(METRIC_ERROR).increment(1);
        warn!(key, error = %err, "Cache write failed; entry will be rebuilt on next read");
    }
}
