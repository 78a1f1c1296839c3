//! PostgreSQL order repository.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::{DomainError, Order};
use crate::ports::OrderRepository;

use super::{map_create_err, map_err};

#[derive(Clone)]
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str =
    "order_id, created_date, start_date, end_date, customer_id, logged_by_id, deleted";

fn map_row(row: &PgRow) -> Result<Order, DomainError> {
    Ok(Order {
        order_id: row.try_get("order_id").map_err(|e| map_err(e, "order"))?,
        created_date: row
            .try_get("created_date")
            .map_err(|e| map_err(e, "order"))?,
        start_date: row.try_get("start_date").map_err(|e| map_err(e, "order"))?,
        end_date: row.try_get("end_date").map_err(|e| map_err(e, "order"))?,
        customer_id: row
            .try_get("customer_id")
            .map_err(|e| map_err(e, "order"))?,
        logged_by_id: row
            .try_get("logged_by_id")
            .map_err(|e| map_err(e, "order"))?,
        deleted: row.try_get("deleted").map_err(|e| map_err(e, "order"))?,
    })
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn create(
        &self,
        created_date: NaiveDate,
        customer_id: Option<i32>,
        logged_by_id: Option<i32>,
    ) -> Result<Order, DomainError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO orders (created_date, customer_id, logged_by_id, deleted)
            VALUES ($1, $2, $3, FALSE)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(created_date)
        .bind(customer_id)
        .bind(logged_by_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_create_err(e, "create order"))?;
        map_row(&row)
    }

    async fn read_by_id(
        &self,
        order_id: i32,
        include_deleted: bool,
    ) -> Result<Option<Order>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM orders WHERE order_id = $1 AND (deleted = FALSE OR $2)"
        ))
        .bind(order_id)
        .bind(include_deleted)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_err(e, "read order"))?;
        row.as_ref().map(map_row).transpose()
    }

    async fn list(&self, include_deleted: bool) -> Result<Vec<Order>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {COLUMNS} FROM orders WHERE deleted = FALSE OR $1 ORDER BY order_id"
        ))
        .bind(include_deleted)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_err(e, "list orders"))?;
        rows.iter().map(map_row).collect()
    }

    async fn update_dates(
        &self,
        order_id: i32,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE orders SET start_date = $2, end_date = $3
            WHERE order_id = $1 AND deleted = FALSE
            "#,
        )
        .bind(order_id)
        .bind(start)
        .bind(end)
        .execute(&self.pool)
        .await
        .map_err(|e| map_err(e, "update order dates"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn soft_delete(&self, order_id: i32) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "UPDATE orders SET deleted = TRUE WHERE order_id = $1 AND deleted = FALSE",
        )
        .bind(order_id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_err(e, "delete order"))?;
        Ok(result.rows_affected() > 0)
    }
}
