//! Item lifecycle: tags, positions, overdue flags.

use std::sync::Arc;

use crate::domain::{DomainError, Item, Position};
use crate::ports::ItemRepository;

pub struct ItemService {
    items: Arc<dyn ItemRepository>,
}

impl ItemService {
    pub fn new(items: Arc<dyn ItemRepository>) -> Self {
        Self { items }
    }

    /// Create an item. A duplicate tag — deleted rows included — surfaces
    /// as a constraint violation from the store.
    pub async fn create_item(
        &self,
        tag_id: &str,
        position: Position,
        overdue: bool,
    ) -> Result<Item, DomainError> {
        if tag_id.trim().is_empty() {
            return Err(DomainError::validation("tagId must not be blank"));
        }
        self.items.create(tag_id, position, Some(overdue)).await
    }

    pub async fn get_item_by_id(
        &self,
        item_id: i32,
        include_deleted: bool,
    ) -> Result<Option<Item>, DomainError> {
        self.items.read_by_id(item_id, include_deleted).await
    }

    pub async fn get_item_by_tag(
        &self,
        tag_id: &str,
        include_deleted: bool,
    ) -> Result<Option<Item>, DomainError> {
        self.items.read_by_tag(tag_id, include_deleted).await
    }

    pub async fn move_item(&self, item_id: i32, position: Position) -> Result<bool, DomainError> {
        self.items.update_position(item_id, position).await
    }

    pub async fn mark_overdue(&self, item_id: i32, overdue: bool) -> Result<bool, DomainError> {
        self.items.update_overdue(item_id, overdue).await
    }

    pub async fn delete_item(&self, item_id: i32) -> Result<bool, DomainError> {
        self.items.soft_delete(item_id).await
    }

    pub async fn list_active_items(&self) -> Result<Vec<Item>, DomainError> {
        self.items.list(false).await
    }

    pub async fn list_items_for_order(
        &self,
        order_id: i32,
        include_deleted: bool,
    ) -> Result<Vec<Item>, DomainError> {
        self.items.list_by_order(order_id, include_deleted).await
    }
}
