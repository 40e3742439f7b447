//! Dish service: leaf level of the hierarchy.
//!
//! Dishes carry no aggregate counts of their own, so any decodable point-key
//! hit is trusted. The full identity path (menu, submenu, dish) flows
//! through every operation: the key scheme encodes it and the repository
//! verifies it, so a mismatched path never primes a key.

use std::sync::Arc;

use uuid::Uuid;

use crate::cache::{CacheKey, CacheStore, CacheTrigger};
use crate::domain::entities::DishRecord;

use super::cached::{read_cached, write_cached};
use super::error::ServiceError;
use super::repos::{DishesRepo, NewDish, SubmenusRepo, UpdateDish};

const ENTITY: &str = "dish";
const PARENT: &str = "submenu";

pub struct DishService {
    submenus: Arc<dyn SubmenusRepo>,
    repo: Arc<dyn DishesRepo>,
    cache: Arc<dyn CacheStore>,
    trigger: Arc<CacheTrigger>,
}

impl DishService {
    pub fn new(
        submenus: Arc<dyn SubmenusRepo>,
        repo: Arc<dyn DishesRepo>,
        cache: Arc<dyn CacheStore>,
        trigger: Arc<CacheTrigger>,
    ) -> Self {
        Self {
            submenus,
            repo,
            cache,
            trigger,
        }
    }

    async fn require_submenu(&self, menu_id: Uuid, submenu_id: Uuid) -> Result<(), ServiceError> {
        let submenu = self
            .submenus
            .find_by_id(menu_id, submenu_id)
            .await
            .map_err(|err| ServiceError::from_repo(PARENT, err))?;
        if submenu.is_none() {
            return Err(ServiceError::not_found(PARENT));
        }
        Ok(())
    }

    pub async fn create(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
        params: NewDish,
    ) -> Result<DishRecord, ServiceError> {
        self.require_submenu(menu_id, submenu_id).await?;

        let dish = self
            .repo
            .insert(submenu_id, params)
            .await
            .map_err(|err| ServiceError::from_repo(ENTITY, err))?;

        let key = CacheKey::Dish {
            menu_id,
            submenu_id,
            dish_id: dish.id,
        }
        .render();
        write_cached(self.cache.as_ref(), &key, &dish).await;
        self.trigger.dish_upserted(menu_id, submenu_id).await;
        Ok(dish)
    }

    pub async fn update(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
        dish_id: Uuid,
        params: UpdateDish,
    ) -> Result<DishRecord, ServiceError> {
        let dish = self
            .repo
            .update(menu_id, submenu_id, dish_id, params)
            .await
            .map_err(|err| ServiceError::from_repo(ENTITY, err))?
            .ok_or_else(|| ServiceError::not_found(ENTITY))?;

        let key = CacheKey::Dish {
            menu_id,
            submenu_id,
            dish_id,
        }
        .render();
        write_cached(self.cache.as_ref(), &key, &dish).await;
        self.trigger.dish_upserted(menu_id, submenu_id).await;
        Ok(dish)
    }

    pub async fn get(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
        dish_id: Uuid,
    ) -> Result<DishRecord, ServiceError> {
        let key = CacheKey::Dish {
            menu_id,
            submenu_id,
            dish_id,
        }
        .render();
        if let Some(dish) = read_cached::<DishRecord>(self.cache.as_ref(), &key).await {
            return Ok(dish);
        }

        let dish = self
            .repo
            .find_by_id(menu_id, submenu_id, dish_id)
            .await
            .map_err(|err| ServiceError::from_repo(ENTITY, err))?
            .ok_or_else(|| ServiceError::not_found(ENTITY))?;

        write_cached(self.cache.as_ref(), &key, &dish).await;
        Ok(dish)
    }

    pub async fn delete(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
        dish_id: Uuid,
    ) -> Result<(), ServiceError> {
        let deleted = self
            .repo
            .delete(menu_id, submenu_id, dish_id)
            .await
            .map_err(|err| ServiceError::from_repo(ENTITY, err))?;
        if !deleted {
            return Err(ServiceError::not_found(ENTITY));
        }

        self.trigger.dish_deleted(menu_id, submenu_id, dish_id).await;
        Ok(())
    }

    pub async fn list(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
    ) -> Result<Vec<DishRecord>, ServiceError> {
        let key = CacheKey::DishList {
            menu_id,
            submenu_id,
        }
        .render();
        if let Some(dishes) = read_cached::<Vec<DishRecord>>(self.cache.as_ref(), &key).await {
            return Ok(dishes);
        }

        let dishes = self
            .repo
            .list_by_submenu(menu_id, submenu_id)
            .await
            .map_err(|err| ServiceError::from_repo(ENTITY, err))?;
        write_cached(self.cache.as_ref(), &key, &dishes).await;
        Ok(dishes)
    }
}
