//! Tavolo cache subsystem.
//!
//! A hierarchy-aware cache-aside layer for the menu catalog:
//!
//! - **Key scheme**: deterministic string keys from identity paths
//! - **Store**: opaque blobs behind [`CacheStore`], uniform write-time TTL
//! - **Events → consumer → trigger**: invalidation cascades published as
//!   events and applied as deduplicated key/prefix deletions
//!
//! The relational store is the single source of truth; everything cached
//! here is derived data that a mutation invalidates within one request
//! cycle, with the TTL as backstop.

mod config;
mod consumer;
mod events;
mod keys;
mod lock;
mod store;
mod trigger;

pub use config::CacheConfig;
pub use consumer::{CacheConsumer, InvalidationPlan};
pub use events::{CacheEvent, Epoch, EventKind, EventQueue};
pub use keys::{CacheKey, dish_list_prefix, menu_subtree_prefix, submenu_subtree_prefix};
pub use store::{CacheError, CacheStore, MemoryStore};
pub use trigger::CacheTrigger;
