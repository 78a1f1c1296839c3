//! PostgreSQL item repository.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::{DomainError, Item, Position};
use crate::ports::ItemRepository;

use super::{map_create_err, map_err};

#[derive(Clone)]
pub struct PostgresItemRepository {
    pool: PgPool,
}

impl PostgresItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str = "item_id, tag_id, position, is_overdue, deleted";

fn map_row(row: &PgRow) -> Result<Item, DomainError> {
    let position: String = row
        .try_get("position")
        .map_err(|e| map_err(e, "item.position"))?;
    Ok(Item {
        item_id: row.try_get("item_id").map_err(|e| map_err(e, "item"))?,
        tag_id: row.try_get("tag_id").map_err(|e| map_err(e, "item"))?,
        position: Position::parse(&position)
            .ok_or_else(|| DomainError::store(format!("unknown position '{position}'")))?,
        is_overdue: row.try_get("is_overdue").map_err(|e| map_err(e, "item"))?,
        deleted: row.try_get("deleted").map_err(|e| map_err(e, "item"))?,
    })
}

#[async_trait]
impl ItemRepository for PostgresItemRepository {
    async fn create(
        &self,
        tag_id: &str,
        position: Position,
        is_overdue: Option<bool>,
    ) -> Result<Item, DomainError> {
        // The unique index on tag_id spans deleted rows; a collision comes
        // back as a constraint violation.
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO items (tag_id, position, is_overdue, deleted)
            VALUES ($1, $2, $3, FALSE)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(tag_id)
        .bind(position.as_str())
        .bind(is_overdue)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_create_err(e, "create item"))?;
        map_row(&row)
    }

    async fn read_by_id(
        &self,
        item_id: i32,
        include_deleted: bool,
    ) -> Result<Option<Item>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM items WHERE item_id = $1 AND (deleted = FALSE OR $2)"
        ))
        .bind(item_id)
        .bind(include_deleted)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_err(e, "read item"))?;
        row.as_ref().map(map_row).transpose()
    }

    async fn read_by_tag(
        &self,
        tag_id: &str,
        include_deleted: bool,
    ) -> Result<Option<Item>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM items WHERE tag_id = $1 AND (deleted = FALSE OR $2)"
        ))
        .bind(tag_id)
        .bind(include_deleted)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_err(e, "read item by tag"))?;
        row.as_ref().map(map_row).transpose()
    }

    async fn list(&self, include_deleted: bool) -> Result<Vec<Item>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM items WHERE deleted = FALSE OR $1 ORDER BY item_id"
        ))
        .bind(include_deleted)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_err(e, "list items"))?;
        rows.iter().map(map_row).collect()
    }

    async fn list_by_order(
        &self,
        order_id: i32,
        include_deleted: bool,
    ) -> Result<Vec<Item>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT i.item_id, i.tag_id, i.position, i.is_overdue, i.deleted
            FROM items i
            JOIN order_items oi ON oi.item_id = i.item_id
            WHERE oi.order_id = $1
              AND (oi.deleted = FALSE OR $2)
              AND (i.deleted = FALSE OR $2)
            ORDER BY i.item_id
            "#,
        )
        .bind(order_id)
        .bind(include_deleted)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_err(e, "list items for order"))?;
        rows.iter().map(map_row).collect()
    }

    async fn update_position(
        &self,
        item_id: i32,
        position: Position,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "UPDATE items SET position = $2 WHERE item_id = $1 AND deleted = FALSE",
        )
        .bind(item_id)
        .bind(position.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| map_err(e, "update position"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_overdue(&self, item_id: i32, overdue: bool) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "UPDATE items SET is_overdue = $2 WHERE item_id = $1 AND deleted = FALSE",
        )
        .bind(item_id)
        .bind(overdue)
        .execute(&self.pool)
        .await
        .map_err(|e| map_err(e, "update overdue"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn soft_delete(&self, item_id: i32) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "UPDATE items SET deleted = TRUE WHERE item_id = $1 AND deleted = FALSE",
        )
        .bind(item_id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_err(e, "delete item"))?;
        Ok(result.rows_affected() > 0)
    }
}
