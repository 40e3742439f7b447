//! Catalog reconciliation.
//!
//! Periodically an external spreadsheet is the authority for the whole
//! catalog. Parsing the file is someone else's job; this module takes the
//! already-parsed rows, pushes them through the same services the API
//! uses (so every write triggers the identical invalidation cascade), and
//! deletes whatever the spreadsheet no longer mentions.
//!
//! Rows arrive in document order: a submenu row belongs to the nearest
//! menu row above it, a dish row to the nearest submenu row.

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::domain::price::Price;

use super::dishes::DishService;
use super::error::ServiceError;
use super::menus::MenuService;
use super::repos::{NewDish, NewMenu, NewSubmenu, UpdateDish, UpdateMenu, UpdateSubmenu};
use super::submenus::SubmenuService;

/// One parsed spreadsheet row. `id` present means the row claims an
/// existing record; absent means the row is new.
#[derive(Debug, Clone)]
pub enum CatalogRow {
    Menu {
        id: Option<Uuid>,
        title: String,
        description: String,
    },
    Submenu {
        id: Option<Uuid>,
        title: String,
        description: String,
    },
    Dish {
        id: Option<Uuid>,
        title: String,
        description: String,
        price: Price,
    },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub created: u64,
    pub updated: u64,
    pub deleted: u64,
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("{kind} row has no parent row above it")]
    Orphan { kind: &'static str },
    #[error(transparent)]
    Service(#[from] ServiceError),
}

pub struct CatalogSync {
    menus: Arc<MenuService>,
    submenus: Arc<SubmenuService>,
    dishes: Arc<DishService>,
}

impl CatalogSync {
    pub fn new(
        menus: Arc<MenuService>,
        submenus: Arc<SubmenuService>,
        dishes: Arc<DishService>,
    ) -> Self {
        Self {
            menus,
            submenus,
            dishes,
        }
    }

    /// Reconcile the catalog with `rows`: upsert everything the rows
    /// describe, then delete every record the rows no longer mention.
    pub async fn apply(&self, rows: &[CatalogRow]) -> Result<SyncReport, SyncError> {
        // Snapshot the identity paths that exist before the run; deletions
        // are computed against this, not against mid-run state.
        let before = self.menus.full_summary().await.map_err(SyncError::from)?;

        let mut report = SyncReport::default();
        let mut seen_menus: HashSet<Uuid> = HashSet::new();
        let mut seen_submenus: HashSet<(Uuid, Uuid)> = HashSet::new();
        let mut seen_dishes: HashSet<(Uuid, Uuid, Uuid)> = HashSet::new();

        let mut current_menu: Option<Uuid> = None;
        let mut current_submenu: Option<Uuid> = None;

        for row in rows {
            match row {
                CatalogRow::Menu {
                    id,
                    title,
                    description,
                } => {
                    let menu_id = match id {
                        Some(id) => {
                            self.menus
                                .update(
                                    *id,
                                    UpdateMenu {
                                        title: title.clone(),
                                        description: description.clone(),
                                    },
                                )
                                .await?;
                            report.updated += 1;
                            *id
                        }
                        None => {
                            let menu = self
                                .menus
                                .create(NewMenu {
                                    title: title.clone(),
                                    description: description.clone(),
                                })
                                .await?;
                            report.created += 1;
                            menu.id
                        }
                    };
                    seen_menus.insert(menu_id);
                    current_menu = Some(menu_id);
                    current_submenu = None;
                }
                CatalogRow::Submenu {
                    id,
                    title,
                    description,
                } => {
                    let menu_id = current_menu.ok_or(SyncError::Orphan { kind: "submenu" })?;
                    let submenu_id = match id {
                        Some(id) => {
                            self.submenus
                                .update(
                                    menu_id,
                                    *id,
                                    UpdateSubmenu {
                                        title: title.clone(),
                                        description: description.clone(),
                                    },
                                )
                                .await?;
                            report.updated += 1;
                            *id
                        }
                        None => {
                            let submenu = self
                                .submenus
                                .create(
                                    menu_id,
                                    NewSubmenu {
                                        title: title.clone(),
                                        description: description.clone(),
                                    },
                                )
                                .await?;
                            report.created += 1;
                            submenu.id
                        }
                    };
                    seen_submenus.insert((menu_id, submenu_id));
                    current_submenu = Some(submenu_id);
                }
                CatalogRow::Dish {
                    id,
                    title,
                    description,
                    price,
                } => {
                    let menu_id = current_menu.ok_or(SyncError::Orphan { kind: "dish" })?;
                    let submenu_id = current_submenu.ok_or(SyncError::Orphan { kind: "dish" })?;
                    let dish_id = match id {
                        Some(id) => {
                            self.dishes
                                .update(
                                    menu_id,
                                    submenu_id,
                                    *id,
                                    UpdateDish {
                                        title: title.clone(),
                                        description: description.clone(),
                                        price: *price,
                                    },
                                )
                                .await?;
                            report.updated += 1;
                            *id
                        }
                        None => {
                            let dish = self
                                .dishes
                                .create(
                                    menu_id,
                                    submenu_id,
                                    NewDish {
                                        title: title.clone(),
                                        description: description.clone(),
                                        price: *price,
                                    },
                                )
                                .await?;
                            report.created += 1;
                            dish.id
                        }
                    };
                    seen_dishes.insert((menu_id, submenu_id, dish_id));
                }
            }
        }

        // Delete pass, leaf-sparing: a deleted menu already takes its
        // subtree with it, so descendants only need their own delete when
        // the parent survives.
        for menu in &before {
            let menu_id = menu.menu.id;
            if !seen_menus.contains(&menu_id) {
                self.menus.delete(menu_id).await?;
                report.deleted += 1;
                continue;
            }
            for submenu in &menu.submenus {
                let submenu_id = submenu.submenu.id;
                if !seen_submenus.contains(&(menu_id, submenu_id)) {
                    self.submenus.delete(menu_id, submenu_id).await?;
                    report.deleted += 1;
                    continue;
                }
                for dish in &submenu.dishes {
                    if !seen_dishes.contains(&(menu_id, submenu_id, dish.id)) {
                        self.dishes.delete(menu_id, submenu_id, dish.id).await?;
                        report.deleted += 1;
                    }
                }
            }
        }

        info!(
            created = report.created,
            updated = report.updated,
            deleted = report.deleted,
            "Catalog reconciliation finished"
        );
        Ok(report)
    }
}
