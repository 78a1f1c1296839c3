//! PostgreSQL order ↔ item relation repository.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::{DomainError, OrderItem};
use crate::ports::OrderItemRepository;

use super::{map_create_err, map_err};

#[derive(Clone)]
pub struct PostgresOrderItemRepository {
    pool: PgPool,
}

impl PostgresOrderItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_row(row: &PgRow) -> Result<OrderItem, DomainError> {
    Ok(OrderItem {
        order_id: row
            .try_get("order_id")
            .map_err(|e| map_err(e, "order_item"))?,
        item_id: row
            .try_get("item_id")
            .map_err(|e| map_err(e, "order_item"))?,
        deleted: row
            .try_get("deleted")
            .map_err(|e| map_err(e, "order_item"))?,
    })
}

#[async_trait]
impl OrderItemRepository for PostgresOrderItemRepository {
    async fn find(
        &self,
        order_id: i32,
        item_id: i32,
        include_deleted: bool,
    ) -> Result<Option<OrderItem>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT order_id, item_id, deleted
            FROM order_items
            WHERE order_id = $1 AND item_id = $2 AND (deleted = FALSE OR $3)
            "#,
        )
        .bind(order_id)
        .bind(item_id)
        .bind(include_deleted)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_err(e, "find relation"))?;
        row.as_ref().map(map_row).transpose()
    }

    async fn find_active_for_item(
        &self,
        item_id: i32,
    ) -> Result<Option<OrderItem>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT order_id, item_id, deleted
            FROM order_items
            WHERE item_id = $1 AND deleted = FALSE
            LIMIT 1
            "#,
        )
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_err(e, "find holder"))?;
        row.as_ref().map(map_row).transpose()
    }

    async fn insert(&self, order_id: i32, item_id: i32) -> Result<OrderItem, DomainError> {
        let row = sqlx::query(
            r#"
            INSERT INTO order_items (order_id, item_id, deleted)
            VALUES ($1, $2, FALSE)
            RETURNING order_id, item_id, deleted
            "#,
        )
        .bind(order_id)
        .bind(item_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_create_err(e, "attach relation"))?;
        map_row(&row)
    }

    async fn revive(&self, order_id: i32, item_id: i32) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE order_items SET deleted = FALSE
            WHERE order_id = $1 AND item_id = $2 AND deleted = TRUE
            "#,
        )
        .bind(order_id)
        .bind(item_id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_err(e, "revive relation"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn detach(&self, order_id: i32, item_id: i32) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE order_items SET deleted = TRUE
            WHERE order_id = $1 AND item_id = $2 AND deleted = FALSE
            "#,
        )
        .bind(order_id)
        .bind(item_id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_err(e, "detach relation"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, include_deleted: bool) -> Result<Vec<OrderItem>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT order_id, item_id, deleted
            FROM order_items
            WHERE deleted = FALSE OR $1
            ORDER BY order_id, item_id
            "#,
        )
        .bind(include_deleted)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_err(e, "list relations"))?;
        rows.iter().map(map_row).collect()
    }

    async fn list_by_order(
        &self,
        order_id: i32,
        include_deleted: bool,
    ) -> Result<Vec<OrderItem>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT order_id, item_id, deleted
            FROM order_items
            WHERE order_id = $1 AND (deleted = FALSE OR $2)
            ORDER BY item_id
            "#,
        )
        .bind(order_id)
        .bind(include_deleted)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_err(e, "list relations for order"))?;
        rows.iter().map(map_row).collect()
    }

    async fn count_active_items(&self, order_id: i32) -> Result<i64, DomainError> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS n FROM order_items WHERE order_id = $1 AND deleted = FALSE",
        )
        .bind(order_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_err(e, "count relations"))?;
        row.try_get("n").map_err(|e| map_err(e, "count relations"))
    }
}
