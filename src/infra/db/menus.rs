use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::query_as;
use uuid::Uuid;

use crate::application::repos::{MenusRepo, NewMenu, RepoError, UpdateMenu};
use crate::domain::entities::{MenuRecord, MenuTree, MenuWithCounts, SubmenuTree};

use super::dishes::DishRow;
use super::submenus::SubmenuRow;
use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct MenuRow {
    id: Uuid,
    title: String,
    description: String,
}

impl From<MenuRow> for MenuRecord {
    fn from(row: MenuRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MenuCountsRow {
    id: Uuid,
    title: String,
    description: String,
    submenus_count: i64,
    dishes_count: i64,
}

impl From<MenuCountsRow> for MenuWithCounts {
    fn from(row: MenuCountsRow) -> Self {
        Self {
            menu: MenuRecord {
                id: row.id,
                title: row.title,
                description: row.description,
            },
            submenus_count: row.submenus_count,
            dishes_count: row.dishes_count,
        }
    }
}

// COUNT(DISTINCT s.id) guards against the join fanout each dish row
// introduces; dishes only pair with their own submenu, so COUNT(d.id)
// needs no distinct.
const MENU_COUNTS_SELECT: &str = "SELECT m.id, m.title, m.description, \
    COUNT(DISTINCT s.id) AS submenus_count, \
    COUNT(d.id) AS dishes_count \
    FROM menus m \
    LEFT JOIN submenus s ON s.menu_id = m.id \
    LEFT JOIN dishes d ON d.submenu_id = s.id";

#[async_trait]
impl MenusRepo for PostgresRepositories {
    async fn insert(&self, params: NewMenu) -> Result<MenuRecord, RepoError> {
        let row: MenuRow = query_as(
            "INSERT INTO menus (id, title, description) VALUES ($1, $2, $3) \
             RETURNING id, title, description",
        )
        .bind(Uuid::new_v4())
        .bind(&params.title)
        .bind(&params.description)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<MenuRecord>, RepoError> {
        let row: Option<MenuRow> =
            query_as("SELECT id, title, description FROM menus WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool())
                .await
                .map_err(map_sqlx_error)?;

        Ok(row.map(Into::into))
    }

    async fn find_with_counts(&self, id: Uuid) -> Result<Option<MenuWithCounts>, RepoError> {
        let row: Option<MenuCountsRow> =
            query_as(&format!("{MENU_COUNTS_SELECT} WHERE m.id = $1 GROUP BY m.id"))
                .bind(id)
                .fetch_optional(self.pool())
                .await
                .map_err(map_sqlx_error)?;

        Ok(row.map(Into::into))
    }

    async fn list_with_counts(&self) -> Result<Vec<MenuWithCounts>, RepoError> {
        let rows: Vec<MenuCountsRow> =
            query_as(&format!("{MENU_COUNTS_SELECT} GROUP BY m.id ORDER BY m.title"))
                .fetch_all(self.pool())
                .await
                .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(&self, id: Uuid, params: UpdateMenu) -> Result<Option<MenuRecord>, RepoError> {
        let row: Option<MenuRow> = query_as(
            "UPDATE menus SET title = $2, description = $3 WHERE id = $1 \
             RETURNING id, title, description",
        )
        .bind(id)
        .bind(&params.title)
        .bind(&params.description)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Into::into))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM menus WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn full_tree(&self) -> Result<Vec<MenuTree>, RepoError> {
        // One query per table, assembled here; no per-parent round trips.
        let menus: Vec<MenuRow> =
            query_as("SELECT id, title, description FROM menus ORDER BY title")
                .fetch_all(self.pool())
                .await
                .map_err(map_sqlx_error)?;

        let submenus: Vec<SubmenuRow> = query_as(
            "SELECT id, menu_id, title, description FROM submenus ORDER BY title",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let dishes: Vec<DishRow> = query_as(
            "SELECT id, submenu_id, title, description, price::text AS price \
             FROM dishes ORDER BY title",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        let mut dishes_by_submenu: HashMap<Uuid, Vec<_>> = HashMap::new();
        for row in dishes {
            let record = row.into_record()?;
            dishes_by_submenu
                .entry(record.submenu_id)
                .or_default()
                .push(record);
        }

        let mut submenus_by_menu: HashMap<Uuid, Vec<SubmenuTree>> = HashMap::new();
        for row in submenus {
            let submenu = crate::domain::entities::SubmenuRecord::from(row);
            let dishes = dishes_by_submenu.remove(&submenu.id).unwrap_or_default();
            submenus_by_menu
                .entry(submenu.menu_id)
                .or_default()
                .push(SubmenuTree { submenu, dishes });
        }

        Ok(menus
            .into_iter()
            .map(|row| {
                let menu = MenuRecord::from(row);
                let submenus = submenus_by_menu.remove(&menu.id).unwrap_or_default();
                MenuTree { menu, submenus }
            })
            .collect())
    }
}
