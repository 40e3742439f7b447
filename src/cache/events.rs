//! Invalidation events.
//!
//! Mutating operations publish an event describing what changed; the
//! consumer turns batches of events into key deletions. Queueing decouples
//! the repository commit from the cache sweep, so cascades can run after
//! the response is already on its way back to the caller.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use super::lock::mutex_lock;

const SOURCE: &str = "cache::events";

/// Monotonic sequence number for ordering events within this process.
pub type Epoch = u64;

#[derive(Debug, Clone)]
pub struct CacheEvent {
    /// Unique identifier for idempotency.
    pub id: Uuid,
    pub epoch: Epoch,
    pub kind: EventKind,
    pub published_at: OffsetDateTime,
}

impl CacheEvent {
    pub fn new(kind: EventKind, epoch: Epoch) -> Self {
        Self {
            id: Uuid::new_v4(),
            epoch,
            kind,
            published_at: OffsetDateTime::now_utc(),
        }
    }
}

/// What changed. Each variant carries the identity path the consumer needs
/// to derive the stale key set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// A menu was created or updated. Its point key was overwritten in
    /// place; only the list and summary views went stale.
    MenuUpserted,
    /// A menu was deleted, cascading to all descendants.
    MenuDeleted { menu_id: Uuid },
    /// A submenu was created or updated under `menu_id`.
    SubmenuUpserted { menu_id: Uuid },
    /// A submenu was deleted, cascading to its dishes.
    SubmenuDeleted { menu_id: Uuid, submenu_id: Uuid },
    /// A dish was created or updated.
    DishUpserted { menu_id: Uuid, submenu_id: Uuid },
    /// A dish was deleted.
    DishDeleted {
        menu_id: Uuid,
        submenu_id: Uuid,
        dish_id: Uuid,
    },
    /// Drop every cache entry.
    FlushAll,
}

/// In-memory FIFO queue of invalidation events.
///
/// A mutex is enough here: publishes are cheap and contention is low.
pub struct EventQueue {
    queue: Mutex<VecDeque<CacheEvent>>,
    epoch_counter: AtomicU64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            epoch_counter: AtomicU64::new(0),
        }
    }

    pub fn next_epoch(&self) -> Epoch {
        self.epoch_counter.fetch_add(1, Ordering::SeqCst)
    }

    pub fn publish(&self, kind: EventKind) {
        let event = CacheEvent::new(kind, self.next_epoch());
        debug!(
            event_id = %event.id,
            event_epoch = event.epoch,
            event_kind = ?event.kind,
            "Invalidation event enqueued"
        );
        mutex_lock(&self.queue, SOURCE, "publish").push_back(event);
    }

    /// Take up to `limit` events off the front of the queue.
    pub fn drain(&self, limit: usize) -> Vec<CacheEvent> {
        let mut queue = mutex_lock(&self.queue, SOURCE, "drain");
        let count = limit.min(queue.len());
        queue.drain(..count).collect()
    }

    pub fn len(&self) -> usize {
        mutex_lock(&self.queue, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}
