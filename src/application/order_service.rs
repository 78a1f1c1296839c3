//! Order lifecycle rules.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use crate::domain::{DomainError, Order};
use crate::ports::OrderRepository;

pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
}

impl OrderService {
    pub fn new(orders: Arc<dyn OrderRepository>) -> Self {
        Self { orders }
    }

    /// Create an order. The creation date defaults to today and is
    /// immutable from then on.
    pub async fn create_order(
        &self,
        created_date: Option<NaiveDate>,
        customer_id: Option<i32>,
        logged_by_id: Option<i32>,
    ) -> Result<Order, DomainError> {
        let created = created_date.unwrap_or_else(|| Utc::now().date_naive());
        self.orders.create(created, customer_id, logged_by_id).await
    }

    pub async fn get_order(
        &self,
        order_id: i32,
        include_deleted: bool,
    ) -> Result<Option<Order>, DomainError> {
        self.orders.read_by_id(order_id, include_deleted).await
    }

    /// Set start/end. Returns `false` without writing when both are present
    /// and the end precedes the start.
    pub async fn update_order_dates(
        &self,
        order_id: i32,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<bool, DomainError> {
        if !Order::dates_valid(start, end) {
            tracing::warn!(order_id, ?start, ?end, "end date before start date");
            return Ok(false);
        }
        self.orders.update_dates(order_id, start, end).await
    }

    pub async fn soft_delete_order(&self, order_id: i32) -> Result<bool, DomainError> {
        self.orders.soft_delete(order_id).await
    }

    pub async fn list_active_orders(&self) -> Result<Vec<Order>, DomainError> {
        self.orders.list(false).await
    }
}
