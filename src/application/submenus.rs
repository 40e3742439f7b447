//! Submenu service: middle level of the hierarchy.
//!
//! Parent existence is checked against the menus repository before any
//! insert; a stated menu id that does not exist is a not-found, never a
//! foreign-key error surfacing from storage.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cache::{CacheKey, CacheStore, CacheTrigger};
use crate::domain::entities::{SubmenuRecord, SubmenuWithCounts};

use super::cached::{read_cached, write_cached};
use super::error::ServiceError;
use super::repos::{MenusRepo, NewSubmenu, SubmenusRepo, UpdateSubmenu};

const ENTITY: &str = "submenu";
const PARENT: &str = "menu";

/// Point-key payload; the dish count is optional for the same reason as the
/// menu entry's counts.
#[derive(Debug, Serialize, Deserialize)]
struct SubmenuEntry {
    id: Uuid,
    menu_id: Uuid,
    title: String,
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dishes_count: Option<i64>,
}

impl SubmenuEntry {
    fn bare(record: &SubmenuRecord) -> Self {
        Self {
            id: record.id,
            menu_id: record.menu_id,
            title: record.title.clone(),
            description: record.description.clone(),
            dishes_count: None,
        }
    }

    fn enriched(submenu: &SubmenuWithCounts) -> Self {
        Self {
            id: submenu.submenu.id,
            menu_id: submenu.submenu.menu_id,
            title: submenu.submenu.title.clone(),
            description: submenu.submenu.description.clone(),
            dishes_count: Some(submenu.dishes_count),
        }
    }

    fn into_counts(self) -> Option<SubmenuWithCounts> {
        self.dishes_count.map(|dishes_count| SubmenuWithCounts {
            submenu: SubmenuRecord {
                id: self.id,
                menu_id: self.menu_id,
                title: self.title,
                description: self.description,
            },
            dishes_count,
        })
    }
}

pub struct SubmenuService {
    menus: Arc<dyn MenusRepo>,
    repo: Arc<dyn SubmenusRepo>,
    cache: Arc<dyn CacheStore>,
    trigger: Arc<CacheTrigger>,
}

impl SubmenuService {
    pub fn new(
        menus: Arc<dyn MenusRepo>,
        repo: Arc<dyn SubmenusRepo>,
        cache: Arc<dyn CacheStore>,
        trigger: Arc<CacheTrigger>,
    ) -> Self {
        Self {
            menus,
            repo,
            cache,
            trigger,
        }
    }

    async fn require_menu(&self, menu_id: Uuid) -> Result<(), ServiceError> {
        let menu = self
            .menus
            .find_by_id(menu_id)
            .await
            .map_err(|err| ServiceError::from_repo(PARENT, err))?;
        if menu.is_none() {
            return Err(ServiceError::not_found(PARENT));
        }
        Ok(())
    }

    pub async fn create(
        &self,
        menu_id: Uuid,
        params: NewSubmenu,
    ) -> Result<SubmenuRecord, ServiceError> {
        self.require_menu(menu_id).await?;

        let submenu = self
            .repo
            .insert(menu_id, params)
            .await
            .map_err(|err| ServiceError::from_repo(ENTITY, err))?;

        let key = CacheKey::Submenu {
            menu_id,
            submenu_id: submenu.id,
        }
        .render();
        write_cached(self.cache.as_ref(), &key, &SubmenuEntry::bare(&submenu)).await;
        self.trigger.submenu_upserted(menu_id).await;
        Ok(submenu)
    }

    pub async fn update(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
        params: UpdateSubmenu,
    ) -> Result<SubmenuRecord, ServiceError> {
        let submenu = self
            .repo
            .update(menu_id, submenu_id, params)
            .await
            .map_err(|err| ServiceError::from_repo(ENTITY, err))?
            .ok_or_else(|| ServiceError::not_found(ENTITY))?;

        let key = CacheKey::Submenu {
            menu_id,
            submenu_id,
        }
        .render();
        write_cached(self.cache.as_ref(), &key, &SubmenuEntry::bare(&submenu)).await;
        self.trigger.submenu_upserted(menu_id).await;
        Ok(submenu)
    }

    pub async fn get(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
    ) -> Result<SubmenuWithCounts, ServiceError> {
        let key = CacheKey::Submenu {
            menu_id,
            submenu_id,
        }
        .render();
        if let Some(entry) = read_cached::<SubmenuEntry>(self.cache.as_ref(), &key).await {
            if let Some(submenu) = entry.into_counts() {
                return Ok(submenu);
            }
        }

        let submenu = self
            .repo
            .find_with_counts(menu_id, submenu_id)
            .await
            .map_err(|err| ServiceError::from_repo(ENTITY, err))?
            .ok_or_else(|| ServiceError::not_found(ENTITY))?;

        write_cached(self.cache.as_ref(), &key, &SubmenuEntry::enriched(&submenu)).await;
        Ok(submenu)
    }

    pub async fn delete(&self, menu_id: Uuid, submenu_id: Uuid) -> Result<(), ServiceError> {
        let deleted = self
            .repo
            .delete(menu_id, submenu_id)
            .await
            .map_err(|err| ServiceError::from_repo(ENTITY, err))?;
        if !deleted {
            return Err(ServiceError::not_found(ENTITY));
        }

        self.trigger.submenu_deleted(menu_id, submenu_id).await;
        Ok(())
    }

    /// Direct submenus of a menu with their dish counts. A parent with no
    /// children serves an empty list, and the empty list is cached like any
    /// other.
    pub async fn list(&self, menu_id: Uuid) -> Result<Vec<SubmenuWithCounts>, ServiceError> {
        let key = CacheKey::SubmenuList { menu_id }.render();
        if let Some(submenus) =
            read_cached::<Vec<SubmenuWithCounts>>(self.cache.as_ref(), &key).await
        {
            return Ok(submenus);
        }

        let submenus = self
            .repo
            .list_with_counts(menu_id)
            .await
            .map_err(|err| ServiceError::from_repo(ENTITY, err))?;
        write_cached(self.cache.as_ref(), &key, &submenus).await;
        Ok(submenus)
    }
}
