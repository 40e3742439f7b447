use async_trait::async_trait;
use sqlx::query_as;
use uuid::Uuid;

use crate::application::repos::{NewSubmenu, RepoError, SubmenusRepo, UpdateSubmenu};
use crate::domain::entities::{SubmenuRecord, SubmenuWithCounts};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
pub(super) struct SubmenuRow {
    pub id: Uuid,
    pub menu_id: Uuid,
    pub title: String,
    pub description: String,
}

impl From<SubmenuRow> for SubmenuRecord {
    fn from(row: SubmenuRow) -> Self {
        Self {
            id: row.id,
            menu_id: row.menu_id,
            title: row.title,
            description: row.description,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SubmenuCountsRow {
    id: Uuid,
    menu_id: Uuid,
    title: String,
    description: String,
    dishes_count: i64,
}

impl From<SubmenuCountsRow> for SubmenuWithCounts {
    fn from(row: SubmenuCountsRow) -> Self {
        Self {
            submenu: SubmenuRecord {
                id: row.id,
                menu_id: row.menu_id,
                title: row.title,
                description: row.description,
            },
            dishes_count: row.dishes_count,
        }
    }
}

const SUBMENU_COUNTS_SELECT: &str = "SELECT s.id, s.menu_id, s.title, s.description, \
    COUNT(d.id) AS dishes_count \
    FROM submenus s \
    LEFT JOIN dishes d ON d.submenu_id = s.id";

#[async_trait]
impl SubmenusRepo for PostgresRepositories {
    async fn insert(
        &self,
        menu_id: Uuid,
        params: NewSubmenu,
    ) -> Result<SubmenuRecord, RepoError> {
        let row: SubmenuRow = query_as(
            "INSERT INTO submenus (id, menu_id, title, description) VALUES ($1, $2, $3, $4) \
             RETURNING id, menu_id, title, description",
        )
        .bind(Uuid::new_v4())
        .bind(menu_id)
        .bind(&params.title)
        .bind(&params.description)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn find_by_id(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
    ) -> Result<Option<SubmenuRecord>, RepoError> {
        let row: Option<SubmenuRow> = query_as(
            "SELECT id, menu_id, title, description FROM submenus \
             WHERE menu_id = $1 AND id = $2",
        )
        .bind(menu_id)
        .bind(submenu_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Into::into))
    }

    async fn find_with_counts(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
    ) -> Result<Option<SubmenuWithCounts>, RepoError> {
        let row: Option<SubmenuCountsRow> = query_as(&format!(
            "{SUBMENU_COUNTS_SELECT} WHERE s.menu_id = $1 AND s.id = $2 GROUP BY s.id"
        ))
        .bind(menu_id)
        .bind(submenu_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Into::into))
    }

    async fn list_with_counts(
        &self,
        menu_id: Uuid,
    ) -> Result<Vec<SubmenuWithCounts>, RepoError> {
        let rows: Vec<SubmenuCountsRow> = query_as(&format!(
            "{SUBMENU_COUNTS_SELECT} WHERE s.menu_id = $1 GROUP BY s.id ORDER BY s.title"
        ))
        .bind(menu_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
        params: UpdateSubmenu,
    ) -> Result<Option<SubmenuRecord>, RepoError> {
        let row: Option<SubmenuRow> = query_as(
            "UPDATE submenus SET title = $3, description = $4 \
             WHERE menu_id = $1 AND id = $2 \
             RETURNING id, menu_id, title, description",
        )
        .bind(menu_id)
        .bind(submenu_id)
        .bind(&params.title)
        .bind(&params.description)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Into::into))
    }

    async fn delete(&self, menu_id: Uuid, submenu_id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM submenus WHERE menu_id = $1 AND id = $2")
            .bind(menu_id)
            .bind(submenu_id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}
