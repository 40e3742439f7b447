//! Invalidation consumer.
//!
//! Drains queued events, folds them into a deduplicated plan of key and
//! prefix deletions, and executes the plan against the store. Store
//! failures are logged and absorbed: the write-time TTL is the backstop
//! for any entry a failed sweep leaves behind.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use tracing::{debug, warn};
use uuid::Uuid;

use super::config::CacheConfig;
use super::events::{CacheEvent, EventKind, EventQueue};
use super::keys::{CacheKey, dish_list_prefix, menu_subtree_prefix, submenu_subtree_prefix};
use super::store::CacheStore;

const METRIC_CONSUME_MS: &str = "tavolo_cache_consume_ms";
const METRIC_SWEEP_FAILED: &str = "tavolo_cache_sweep_failed_total";

/// Deduplicated set of deletions derived from one event batch.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct InvalidationPlan {
    pub keys: BTreeSet<String>,
    pub prefixes: BTreeSet<String>,
    pub flush_all: bool,
}

impl InvalidationPlan {
    /// Fold a batch of events into one plan.
    pub fn from_events(events: &[CacheEvent]) -> Self {
        let mut plan = Self::default();
        for event in events {
            plan.apply(&event.kind);
        }
        if plan.flush_all {
            // A flush supersedes everything else in the batch.
            plan.keys.clear();
            plan.prefixes.clear();
        }
        plan
    }

    fn apply(&mut self, kind: &EventKind) {
        match *kind {
            EventKind::MenuUpserted => {
                self.stale_menu_list_views();
            }
            EventKind::MenuDeleted { menu_id } => {
                self.prefixes.insert(menu_subtree_prefix(menu_id));
                self.prefixes.insert(dish_list_prefix(menu_id));
                self.keys
                    .insert(CacheKey::SubmenuList { menu_id }.render());
                self.stale_menu_list_views();
            }
            // Enriched ancestor point keys embed aggregate counts, so every
            // child mutation retires them along with the list views.
            EventKind::SubmenuUpserted { menu_id } => {
                self.keys.insert(CacheKey::Menu { menu_id }.render());
                self.keys
                    .insert(CacheKey::SubmenuList { menu_id }.render());
                self.stale_menu_list_views();
            }
            EventKind::SubmenuDeleted {
                menu_id,
                submenu_id,
            } => {
                self.prefixes
                    .insert(submenu_subtree_prefix(menu_id, submenu_id));
                self.keys.insert(CacheKey::Menu { menu_id }.render());
                self.keys.insert(
                    CacheKey::DishList {
                        menu_id,
                        submenu_id,
                    }
                    .render(),
                );
                self.keys
                    .insert(CacheKey::SubmenuList { menu_id }.render());
                self.stale_menu_list_views();
            }
            EventKind::DishUpserted {
                menu_id,
                submenu_id,
            } => {
                self.stale_dish_ancestors(menu_id, submenu_id);
            }
            EventKind::DishDeleted {
                menu_id,
                submenu_id,
                dish_id,
            } => {
                self.keys.insert(
                    CacheKey::Dish {
                        menu_id,
                        submenu_id,
                        dish_id,
                    }
                    .render(),
                );
                self.stale_dish_ancestors(menu_id, submenu_id);
            }
            EventKind::FlushAll => {
                self.flush_all = true;
            }
        }
    }

    // Any mutation anywhere in the hierarchy changes the counts and child
    // records embedded in the all-menus list and the full summary.
    fn stale_menu_list_views(&mut self) {
        self.keys.insert(CacheKey::MenuList.render());
        self.keys.insert(CacheKey::FullSummary.render());
    }

    // A dish mutation changes the dish count on both ancestors' point keys
    // and every list view above it.
    fn stale_dish_ancestors(&mut self, menu_id: Uuid, submenu_id: Uuid) {
        self.keys.insert(CacheKey::Menu { menu_id }.render());
        self.keys.insert(
            CacheKey::Submenu {
                menu_id,
                submenu_id,
            }
            .render(),
        );
        self.keys.insert(
            CacheKey::DishList {
                menu_id,
                submenu_id,
            }
            .render(),
        );
        self.keys
            .insert(CacheKey::SubmenuList { menu_id }.render());
        self.stale_menu_list_views();
    }

    pub fn is_empty(&self) -> bool {
        !self.flush_all && self.keys.is_empty() && self.prefixes.is_empty()
    }
}

/// Drains the event queue and applies the resulting deletions.
pub struct CacheConsumer {
    config: CacheConfig,
    store: Arc<dyn CacheStore>,
    queue: Arc<EventQueue>,
}

impl CacheConsumer {
    pub fn new(config: CacheConfig, store: Arc<dyn CacheStore>, queue: Arc<EventQueue>) -> Self {
        Self {
            config,
            store,
            queue,
        }
    }

    /// Consume one batch. Returns the number of events processed.
    pub async fn consume(&self) -> usize {
        let events = self.queue.drain(self.config.batch_limit());
        if events.is_empty() {
            return 0;
        }

        let started = Instant::now();
        let plan = InvalidationPlan::from_events(&events);
        self.execute(&plan).await;

        histogram!(METRIC_CONSUME_MS).record(started.elapsed().as_secs_f64() * 1000.0);
        debug!(
            events = events.len(),
            keys = plan.keys.len(),
            prefixes = plan.prefixes.len(),
            flush_all = plan.flush_all,
            "Invalidation batch applied"
        );
        events.len()
    }

    /// Consume until the queue is empty. Called when shutting down so no
    /// published invalidation is dropped.
    pub async fn drain_all(&self) {
        while self.consume().await > 0 {}
    }

    async fn execute(&self, plan: &InvalidationPlan) {
        if plan.flush_all {
            if let Err(err) = self.store.flush_all().await {
                self.sweep_failed("flush_all", &err.to_string());
            }
            return;
        }

        if !plan.keys.is_empty() {
            let keys: Vec<String> = plan.keys.iter().cloned().collect();
            if let Err(err) = self.store.delete(&keys).await {
                self.sweep_failed("delete", &err.to_string());
            }
        }

        for prefix in &plan.prefixes {
            if let Err(err) = self.store.delete_by_prefix(prefix).await {
                self.sweep_failed("delete_by_prefix", &err.to_string());
            }
        }
    }

    fn sweep_failed(&self, op: &'static str, error: &str) {
        counter!(METRIC_SWEEP_FAILED).increment(1);
        warn!(op, error, "Cache sweep failed; entries left to TTL expiry");
    }
}
