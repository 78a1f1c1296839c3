//! PostgreSQL scan-log repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::{DomainError, ItemRead};
use crate::ports::ItemReadRepository;

use super::{map_create_err, map_err};

#[derive(Clone)]
pub struct PostgresItemReadRepository {
    pool: PgPool,
}

impl PostgresItemReadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str = "read_id, tag_id, read_time, deleted";

fn map_row(row: &PgRow) -> Result<ItemRead, DomainError> {
    Ok(ItemRead {
        read_id: row.try_get("read_id").map_err(|e| map_err(e, "read"))?,
        tag_id: row.try_get("tag_id").map_err(|e| map_err(e, "read"))?,
        read_time: row.try_get("read_time").map_err(|e| map_err(e, "read"))?,
        deleted: row.try_get("deleted").map_err(|e| map_err(e, "read"))?,
    })
}

#[async_trait]
impl ItemReadRepository for PostgresItemReadRepository {
    async fn insert(
        &self,
        tag_id: &str,
        read_time: DateTime<Utc>,
    ) -> Result<ItemRead, DomainError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO item_reads (tag_id, read_time, deleted)
            VALUES ($1, $2, FALSE)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(tag_id)
        .bind(read_time)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_create_err(e, "insert read"))?;
        map_row(&row)
    }

    async fn read_by_id(
        &self,
        read_id: i32,
        include_deleted: bool,
    ) -> Result<Option<ItemRead>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM item_reads WHERE read_id = $1 AND (deleted = FALSE OR $2)"
        ))
        .bind(read_id)
        .bind(include_deleted)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_err(e, "read scan"))?;
        row.as_ref().map(map_row).transpose()
    }

    async fn update(
        &self,
        read_id: i32,
        tag_id: &str,
        read_time: DateTime<Utc>,
    ) -> Result<Option<ItemRead>, DomainError> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE item_reads SET tag_id = $2, read_time = $3
            WHERE read_id = $1 AND deleted = FALSE
            RETURNING {COLUMNS}
            "#
        ))
        .bind(read_id)
        .bind(tag_id)
        .bind(read_time)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_err(e, "update read"))?;
        row.as_ref().map(map_row).transpose()
    }

    async fn list(&self, include_deleted: bool) -> Result<Vec<ItemRead>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM item_reads WHERE deleted = FALSE OR $1 ORDER BY read_id"
        ))
        .bind(include_deleted)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_err(e, "list reads"))?;
        rows.iter().map(map_row).collect()
    }

    async fn list_for_tag_in_range(
        &self,
        tag_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ItemRead>, DomainError> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {COLUMNS} FROM item_reads
            WHERE tag_id = $1 AND deleted = FALSE
              AND read_time >= $2 AND read_time <= $3
            ORDER BY read_time
            "#
        ))
        .bind(tag_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_err(e, "list reads for tag"))?;
        rows.iter().map(map_row).collect()
    }

    async fn soft_delete(&self, read_id: i32) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "UPDATE item_reads SET deleted = TRUE WHERE read_id = $1 AND deleted = FALSE",
        )
        .bind(read_id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_err(e, "delete read"))?;
        Ok(result.rows_affected() > 0)
    }
}
