use async_trait::async_trait;
use sqlx::query_as;
use uuid::Uuid;

use crate::application::repos::{DishesRepo, NewDish, RepoError, UpdateDish};
use crate::domain::entities::DishRecord;
use crate::domain::price::Price;

use super::{PostgresRepositories, map_sqlx_error};

// Price is selected as text and parsed into the fixed-point type; going
// through a float column type would corrupt the 2-decimal value.
#[derive(sqlx::FromRow)]
pub(super) struct DishRow {
    pub id: Uuid,
    pub submenu_id: Uuid,
    pub title: String,
    pub description: String,
    pub price: String,
}

impl DishRow {
    pub(super) fn into_record(self) -> Result<DishRecord, RepoError> {
        let price: Price = self
            .price
            .parse()
            .map_err(RepoError::from_persistence)?;
        Ok(DishRecord {
            id: self.id,
            submenu_id: self.submenu_id,
            title: self.title,
            description: self.description,
            price,
        })
    }
}

const DISH_RETURNING: &str = "RETURNING id, submenu_id, title, description, price::text AS price";

#[async_trait]
impl DishesRepo for PostgresRepositories {
    async fn insert(&self, submenu_id: Uuid, params: NewDish) -> Result<DishRecord, RepoError> {
        let row: DishRow = query_as(&format!(
            "INSERT INTO dishes (id, submenu_id, title, description, price) \
             VALUES ($1, $2, $3, $4, $5::numeric) {DISH_RETURNING}"
        ))
        .bind(Uuid::new_v4())
        .bind(submenu_id)
        .bind(&params.title)
        .bind(&params.description)
        .bind(params.price.to_string())
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.into_record()
    }

    async fn find_by_id(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
        dish_id: Uuid,
    ) -> Result<Option<DishRecord>, RepoError> {
        let row: Option<DishRow> = query_as(
            "SELECT d.id, d.submenu_id, d.title, d.description, d.price::text AS price \
             FROM dishes d \
             INNER JOIN submenus s ON s.id = d.submenu_id \
             WHERE s.menu_id = $1 AND d.submenu_id = $2 AND d.id = $3",
        )
        .bind(menu_id)
        .bind(submenu_id)
        .bind(dish_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.map(DishRow::into_record).transpose()
    }

    async fn list_by_submenu(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
    ) -> Result<Vec<DishRecord>, RepoError> {
        let rows: Vec<DishRow> = query_as(
            "SELECT d.id, d.submenu_id, d.title, d.description, d.price::text AS price \
             FROM dishes d \
             INNER JOIN submenus s ON s.id = d.submenu_id \
             WHERE s.menu_id = $1 AND s.id = $2 \
             ORDER BY d.title",
        )
        .bind(menu_id)
        .bind(submenu_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(DishRow::into_record).collect()
    }

    async fn update(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
        dish_id: Uuid,
        params: UpdateDish,
    ) -> Result<Option<DishRecord>, RepoError> {
        let row: Option<DishRow> = query_as(
            "UPDATE dishes d SET title = $4, description = $5, price = $6::numeric \
             FROM submenus s \
             WHERE s.id = d.submenu_id AND s.menu_id = $1 \
               AND d.submenu_id = $2 AND d.id = $3 \
             RETURNING d.id, d.submenu_id, d.title, d.description, d.price::text AS price",
        )
        .bind(menu_id)
        .bind(submenu_id)
        .bind(dish_id)
        .bind(&params.title)
        .bind(&params.description)
        .bind(params.price.to_string())
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.map(DishRow::into_record).transpose()
    }

    async fn delete(
        &self,
        menu_id: Uuid,
        submenu_id: Uuid,
        dish_id: Uuid,
    ) -> Result<bool, RepoError> {
        let result = sqlx::query(
            "DELETE FROM dishes d USING submenus s \
             WHERE s.id = d.submenu_id AND s.menu_id = $1 \
               AND d.submenu_id = $2 AND d.id = $3",
        )
        .bind(menu_id)
        .bind(submenu_id)
        .bind(dish_id)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }
}
