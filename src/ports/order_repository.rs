//! Order store contract.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::{DomainError, Order};

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Fails with [`DomainError::Constraint`] when a referenced person id
    /// is not a valid foreign key.
    async fn create(
        &self,
        created_date: NaiveDate,
        customer_id: Option<i32>,
        logged_by_id: Option<i32>,
    ) -> Result<Order, DomainError>;

    async fn read_by_id(
        &self,
        order_id: i32,
        include_deleted: bool,
    ) -> Result<Option<Order>, DomainError>;

    async fn list(&self, include_deleted: bool) -> Result<Vec<Order>, DomainError>;

    /// Overwrites both dates; `created_date` is never touched.
    async fn update_dates(
        &self,
        order_id: i32,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<bool, DomainError>;

    async fn soft_delete(&self, order_id: i32) -> Result<bool, DomainError>;
}
