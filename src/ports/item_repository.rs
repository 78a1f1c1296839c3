//! Item store contract.

use async_trait::async_trait;

use crate::domain::{DomainError, Item, Position};

#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Fails with [`DomainError::Constraint`] on a duplicate tag, deleted
    /// rows included.
    async fn create(
        &self,
        tag_id: &str,
        position: Position,
        is_overdue: Option<bool>,
    ) -> Result<Item, DomainError>;

    async fn read_by_id(
        &self,
        item_id: i32,
        include_deleted: bool,
    ) -> Result<Option<Item>, DomainError>;

    async fn read_by_tag(
        &self,
        tag_id: &str,
        include_deleted: bool,
    ) -> Result<Option<Item>, DomainError>;

    async fn list(&self, include_deleted: bool) -> Result<Vec<Item>, DomainError>;

    /// Items held by an order through its relations; `include_deleted`
    /// widens the relation filter, not the item filter.
    async fn list_by_order(
        &self,
        order_id: i32,
        include_deleted: bool,
    ) -> Result<Vec<Item>, DomainError>;

    async fn update_position(&self, item_id: i32, position: Position)
        -> Result<bool, DomainError>;

    async fn update_overdue(&self, item_id: i32, overdue: bool) -> Result<bool, DomainError>;

    async fn soft_delete(&self, item_id: i32) -> Result<bool, DomainError>;
}
