//! Repository traits describing persistence adapters.
//!
//! The relational store is the single source of truth; these traits are the
//! only way the service layer reads or writes it. Count-enriched reads are
//! single aggregating queries, never N+1 loops.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::entities::{
    DishRecord, MenuRecord, MenuTree, MenuWithCounts, SubmenuRecord, SubmenuWithCounts,
};
use crate::domain::price::Price;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("duplicate record violates unique constraint `{constraint}`")]
    Duplicate { constraint: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct NewMenu {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct UpdateMenu {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct NewSubmenu {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct UpdateSubmenu {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct NewDish {
    pub title: String,
    pub description: String,
    pub price: Price,
}

#[derive(Debug, Clone)]
pub struct UpdateDish {
    pub title: String,
    pub description: String,
    pub price: Price,
}

/// Missing rows surface as `Ok(None)` / `Ok(false)`; the service layer maps
/// them to its not-found taxonomy. `RepoError::Duplicate` carries title
/// uniqueness violations.
#[async_trait]
pub trait MenusRepo: Send + Sync {
    async fn insert(&self, params: NewMenu) -> Result<MenuRecord, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<MenuRecord>, RepoError>;

    /// One aggregating query: the menu plus its direct submenu count and
    /// the total dish count across those submenus.
    async fn find_with_counts(&self, id: Uuid) -> Result<Option<MenuWithCounts>, RepoError>;

    async fn list_with_counts(&self) -> Result<Vec<MenuWithCounts>, RepoError>;

    async fn update(&self, id: Uuid, params: UpdateMenu) -> Result<Option<MenuRecord>, RepoError>;

    /// Deletes the menu and, through storage-level cascade, every
    /// descendant submenu and dish. `false` when the id is unknown.
    async fn delete(&self, id: Uuid) -> Result<bool, RepoError>;

    /// The whole menu → submenu → dish hierarchy in one pass. Also serves
    /// reconciliation callers that diff the catalog against an external
    /// source by full identity path.
    async fn full_tree(&self) -> Result<Vec<MenuTree>, RepoError>;
}

#[async_trait]
pub trait SubmenusRepo: Send + Sync {
    async fn insert(&self, menu_id: Uuid, params: NewSubmenu)
    -> Result<SubmenuRecord, RepoError>;

    async fn find_by_id(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
    ) -> Result<Option<SubmenuRecord>, RepoError>;

    async fn find_with_counts(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
    ) -> Result<Option<SubmenuWithCounts>, RepoError>;

    async fn list_with_counts(&self, menu_id: Uuid)
    -> Result<Vec<SubmenuWithCounts>, RepoError>;

    async fn update(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
        params: UpdateSubmenu,
    ) -> Result<Option<SubmenuRecord>, RepoError>;

    async fn delete(&self, menu_id: Uuid, submenu_id: Uuid) -> Result<bool, RepoError>;
}

/// Every operation that addresses an existing dish takes the full identity
/// path and verifies it against storage; a stated path whose menu does not
/// own the submenu reads as absent.
#[async_trait]
pub trait DishesRepo: Send + Sync {
    async fn insert(&self, submenu_id: Uuid, params: NewDish) -> Result<DishRecord, RepoError>;

    async fn find_by_id(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
        dish_id: Uuid,
    ) -> Result<Option<DishRecord>, RepoError>;

    async fn list_by_submenu(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
    ) -> Result<Vec<DishRecord>, RepoError>;

    async fn update(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
        dish_id: Uuid,
        params: UpdateDish,
    ) -> Result<Option<DishRecord>, RepoError>;

    async fn delete(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
        dish_id: Uuid,
    ) -> Result<bool, RepoError>;
}
