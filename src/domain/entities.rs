//! Domain entities mirrored from persistent storage.
//!
//! The catalog is a fixed three-level hierarchy: a menu owns submenus, a
//! submenu owns dishes. Deleting a parent cascades to every descendant at
//! the storage layer.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::price::Price;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuRecord {
    pub id: Uuid,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmenuRecord {
    pub id: Uuid,
    pub menu_id: Uuid,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DishRecord {
    pub id: Uuid,
    pub submenu_id: Uuid,
    pub title: String,
    pub description: String,
    pub price: Price,
}

/// Menu enriched with its aggregate counts: direct submenus and all dishes
/// reachable through them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuWithCounts {
    #[serde(flatten)]
    pub menu: MenuRecord,
    pub submenus_count: i64,
    pub dishes_count: i64,
}

/// Submenu enriched with its direct dish count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmenuWithCounts {
    #[serde(flatten)]
    pub submenu: SubmenuRecord,
    pub dishes_count: i64,
}

/// Full-hierarchy summary node: one menu with every nested submenu and dish.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuTree {
    #[serde(flatten)]
    pub menu: MenuRecord,
    pub submenus: Vec<SubmenuTree>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmenuTree {
    #[serde(flatten)]
    pub submenu: SubmenuRecord,
    pub dishes: Vec<DishRecord>,
}
