//! Order ↔ item relation store contract.
//!
//! The attach invariant itself (≤1 active relation per item) lives in the
//! order-item service; this port only supplies the primitives the service
//! sequences. All writes are reachable solely from the dispatcher worker,
//! which is what makes the sequence race-free.

use async_trait::async_trait;

use crate::domain::{DomainError, OrderItem};

#[async_trait]
pub trait OrderItemRepository: Send + Sync {
    async fn find(
        &self,
        order_id: i32,
        item_id: i32,
        include_deleted: bool,
    ) -> Result<Option<OrderItem>, DomainError>;

    /// The active relation holding this item, in whatever order.
    async fn find_active_for_item(&self, item_id: i32) -> Result<Option<OrderItem>, DomainError>;

    /// Insert a fresh active relation. The composite key guards duplicate
    /// pairs; a collision surfaces as [`DomainError::Constraint`].
    async fn insert(&self, order_id: i32, item_id: i32) -> Result<OrderItem, DomainError>;

    /// Clear the deleted flag on an existing soft-deleted pair. Returns
    /// `false` when there is no such row.
    async fn revive(&self, order_id: i32, item_id: i32) -> Result<bool, DomainError>;

    /// Soft-delete the active relation. Returns `false` when none is active.
    async fn detach(&self, order_id: i32, item_id: i32) -> Result<bool, DomainError>;

    async fn list(&self, include_deleted: bool) -> Result<Vec<OrderItem>, DomainError>;

    async fn list_by_order(
        &self,
        order_id: i32,
        include_deleted: bool,
    ) -> Result<Vec<OrderItem>, DomainError>;

    async fn count_active_items(&self, order_id: i32) -> Result<i64, DomainError>;
}
