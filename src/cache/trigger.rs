//! Cache trigger.
//!
//! The façade the service layer mutates through: publish an invalidation
//! event and, on the request path, consume it immediately so the stale
//! window stays within the current request cycle. Callers that can afford
//! deferral publish with `consume_now = false` and rely on a background
//! drain.

use std::sync::Arc;

use uuid::Uuid;

use super::consumer::CacheConsumer;
use super::events::{EventKind, EventQueue};

pub struct CacheTrigger {
    queue: Arc<EventQueue>,
    consumer: Arc<CacheConsumer>,
}

impl CacheTrigger {
    pub fn new(queue: Arc<EventQueue>, consumer: Arc<CacheConsumer>) -> Self {
        Self { queue, consumer }
    }

    /// Publish an event; when `consume_now`, apply the whole queue before
    /// returning.
    pub async fn trigger(&self, kind: EventKind, consume_now: bool) {
        self.queue.publish(kind);
        if consume_now {
            self.consumer.consume().await;
        }
    }

    pub async fn menu_upserted(&self) {
        self.trigger(EventKind::MenuUpserted, true).await;
    }

    pub async fn menu_deleted(&self, menu_id: Uuid) {
        self.trigger(EventKind::MenuDeleted { menu_id }, true).await;
    }

    pub async fn submenu_upserted(&self, menu_id: Uuid) {
        self.trigger(EventKind::SubmenuUpserted { menu_id }, true)
            .await;
    }

    pub async fn submenu_deleted(&self, menu_id: Uuid, submenu_id: Uuid) {
        self.trigger(
            EventKind::SubmenuDeleted {
                menu_id,
                submenu_id,
            },
            true,
        )
        .await;
    }

    pub async fn dish_upserted(&self, menu_id: Uuid, submenu_id: Uuid) {
        self.trigger(
            EventKind::DishUpserted {
                menu_id,
                submenu_id,
            },
            true,
        )
        .await;
    }

    pub async fn dish_deleted(&self, menu_id: Uuid, submenu_id: Uuid, dish_id: Uuid) {
        self.trigger(
            EventKind::DishDeleted {
                menu_id,
                submenu_id,
                dish_id,
            },
            true,
        )
        .await;
    }

    pub async fn flush_all(&self) {
        self.trigger(EventKind::FlushAll, true).await;
    }

    pub fn queue(&self) -> &Arc<EventQueue> {
        &self.queue
    }

    pub fn consumer(&self) -> &Arc<CacheConsumer> {
        &self.consumer
    }
}
