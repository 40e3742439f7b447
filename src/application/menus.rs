//! Menu service: cache-aside reads and invalidate-on-write mutations for
//! the top level of the hierarchy.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cache::{CacheKey, CacheStore, CacheTrigger};
use crate::domain::entities::{MenuRecord, MenuTree, MenuWithCounts};

use super::cached::{read_cached, write_cached};
use super::error::ServiceError;
use super::repos::{MenusRepo, NewMenu, UpdateMenu};

const ENTITY: &str = "menu";

/// Point-key payload. Counts are optional: a create or update overwrites
/// the entry without them, and a read only trusts an entry that already
/// carries both.
#[derive(Debug, Serialize, Deserialize)]
struct MenuEntry {
    id: Uuid,
    title: String,
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    submenus_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dishes_count: Option<i64>,
}

impl MenuEntry {
    fn bare(record: &MenuRecord) -> Self {
        Self {
            id: record.id,
            title: record.title.clone(),
            description: record.description.clone(),
            submenus_count: None,
            dishes_count: None,
        }
    }

    fn enriched(menu: &MenuWithCounts) -> Self {
        Self {
            id: menu.menu.id,
            title: menu.menu.title.clone(),
            description: menu.menu.description.clone(),
            submenus_count: Some(menu.submenus_count),
            dishes_count: Some(menu.dishes_count),
        }
    }

    fn into_counts(self) -> Option<MenuWithCounts> {
        match (self.submenus_count, self.dishes_count) {
            (Some(submenus_count), Some(dishes_count)) => Some(MenuWithCounts {
                menu: MenuRecord {
                    id: self.id,
                    title: self.title,
                    description: self.description,
                },
                submenus_count,
                dishes_count,
            }),
            _ => None,
        }
    }
}

pub struct MenuService {
    repo: Arc<dyn MenusRepo>,
    cache: Arc<dyn CacheStore>,
    trigger: Arc<CacheTrigger>,
}

impl MenuService {
    pub fn new(
        repo: Arc<dyn MenusRepo>,
        cache: Arc<dyn CacheStore>,
        trigger: Arc<CacheTrigger>,
    ) -> Self {
        Self {
            repo,
            cache,
            trigger,
        }
    }

    /// Insert a menu, prime its point key, and invalidate the list and
    /// summary views. The repository commit always precedes the cache
    /// writes.
    pub async fn create(&self, params: NewMenu) -> Result<MenuRecord, ServiceError> {
        let menu = self
            .repo
            .insert(params)
            .await
            .map_err(|err| ServiceError::from_repo(ENTITY, err))?;

        let key = CacheKey::Menu { menu_id: menu.id }.render();
        write_cached(self.cache.as_ref(), &key, &MenuEntry::bare(&menu)).await;
        self.trigger.menu_upserted().await;
        Ok(menu)
    }

    pub async fn update(&self, id: Uuid, params: UpdateMenu) -> Result<MenuRecord, ServiceError> {
        let menu = self
            .repo
            .update(id, params)
            .await
            .map_err(|err| ServiceError::from_repo(ENTITY, err))?
            .ok_or_else(|| ServiceError::not_found(ENTITY))?;

        let key = CacheKey::Menu { menu_id: menu.id }.render();
        write_cached(self.cache.as_ref(), &key, &MenuEntry::bare(&menu)).await;
        self.trigger.menu_upserted().await;
        Ok(menu)
    }

    /// Read one menu with its aggregate counts. A cached entry without the
    /// counts (a fresh create or update wrote it) is a miss: the repository
    /// recomputes and the enriched entry is written back.
    pub async fn get(&self, id: Uuid) -> Result<MenuWithCounts, ServiceError> {
        let key = CacheKey::Menu { menu_id: id }.render();
        if let Some(entry) = read_cached::<MenuEntry>(self.cache.as_ref(), &key).await {
            if let Some(menu) = entry.into_counts() {
                return Ok(menu);
            }
        }

        let menu = self
            .repo
            .find_with_counts(id)
            .await
            .map_err(|err| ServiceError::from_repo(ENTITY, err))?
            .ok_or_else(|| ServiceError::not_found(ENTITY))?;

        write_cached(self.cache.as_ref(), &key, &MenuEntry::enriched(&menu)).await;
        Ok(menu)
    }

    /// Delete a menu and cascade: descendants disappear at the storage
    /// layer, and the trigger sweeps every key under the menu's path plus
    /// the stale list views.
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let deleted = self
            .repo
            .delete(id)
            .await
            .map_err(|err| ServiceError::from_repo(ENTITY, err))?;
        if !deleted {
            return Err(ServiceError::not_found(ENTITY));
        }

        self.trigger.menu_deleted(id).await;
        Ok(())
    }

    /// All menus with counts, served from the list-view key until the next
    /// mutation invalidates it.
    pub async fn list(&self) -> Result<Vec<MenuWithCounts>, ServiceError> {
        let key = CacheKey::MenuList.render();
        if let Some(menus) = read_cached::<Vec<MenuWithCounts>>(self.cache.as_ref(), &key).await {
            return Ok(menus);
        }

        let menus = self
            .repo
            .list_with_counts()
            .await
            .map_err(|err| ServiceError::from_repo(ENTITY, err))?;
        write_cached(self.cache.as_ref(), &key, &menus).await;
        Ok(menus)
    }

    /// The whole hierarchy under the well-known summary key. The most
    /// expensive read path and the most aggressively cached one.
    pub async fn full_summary(&self) -> Result<Vec<MenuTree>, ServiceError> {
        let key = CacheKey::FullSummary.render();
        if let Some(tree) = read_cached::<Vec<MenuTree>>(self.cache.as_ref(), &key).await {
            return Ok(tree);
        }

        let tree = self
            .repo
            .full_tree()
            .await
            .map_err(|err| ServiceError::from_repo(ENTITY, err))?;
        write_cached(self.cache.as_ref(), &key, &tree).await;
        Ok(tree)
    }
}
