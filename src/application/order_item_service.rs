//! Attach/detach semantics for the order ↔ item relation.

use std::sync::Arc;

use crate::domain::{DomainError, OrderItem};
use crate::ports::{ItemRepository, OrderItemRepository, OrderRepository};

/// Guards the relation invariant: an item is in at most one active order.
pub struct OrderItemService {
    orders: Arc<dyn OrderRepository>,
    items: Arc<dyn ItemRepository>,
    order_items: Arc<dyn OrderItemRepository>,
}

impl OrderItemService {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        items: Arc<dyn ItemRepository>,
        order_items: Arc<dyn OrderItemRepository>,
    ) -> Self {
        Self {
            orders,
            items,
            order_items,
        }
    }

    /// Attach `item_id` to `order_id`.
    ///
    /// Both parent rows must exist, and no other active relation may hold
    /// the item. A soft-deleted relation for this exact pair is revived
    /// instead of inserting a duplicate.
    pub async fn attach(&self, item_id: i32, order_id: i32) -> Result<OrderItem, DomainError> {
        if self.orders.read_by_id(order_id, true).await?.is_none() {
            return Err(DomainError::not_found("Order", order_id));
        }
        if self.items.read_by_id(item_id, true).await?.is_none() {
            return Err(DomainError::not_found("Item", item_id));
        }

        if let Some(held) = self.order_items.find_active_for_item(item_id).await? {
            return Err(DomainError::constraint(format!(
                "item {item_id} already attached to active order {}",
                held.order_id
            )));
        }

        if self.order_items.revive(order_id, item_id).await? {
            tracing::debug!(order_id, item_id, "revived soft-deleted relation");
            return self
                .order_items
                .find(order_id, item_id, true)
                .await?
                .ok_or_else(|| DomainError::store("revived relation vanished on read-back"));
        }

        let relation = self.order_items.insert(order_id, item_id).await?;
        tracing::info!(order_id, item_id, "attached item to order");
        Ok(relation)
    }

    /// Soft-delete the active relation. Idempotent: returns `false` and
    /// writes nothing when none is active.
    pub async fn detach(&self, item_id: i32, order_id: i32) -> Result<bool, DomainError> {
        let detached = self.order_items.detach(order_id, item_id).await?;
        if detached {
            tracing::info!(order_id, item_id, "detached item from order");
        }
        Ok(detached)
    }

    /// Detach from `from_order_id` and attach to `to_order_id`.
    ///
    /// The repository contract is CRUD-only, so instead of a store
    /// transaction the destination is checked up front and a failed attach
    /// revives the original relation. The dispatcher worker is the sole
    /// writer, which makes the compensation unobservable mid-flight.
    pub async fn move_item(
        &self,
        item_id: i32,
        from_order_id: i32,
        to_order_id: i32,
    ) -> Result<(), DomainError> {
        if from_order_id == to_order_id {
            return Ok(());
        }
        if self.orders.read_by_id(to_order_id, true).await?.is_none() {
            return Err(DomainError::not_found("Order", to_order_id));
        }

        let detached = self.order_items.detach(from_order_id, item_id).await?;
        match self.attach(item_id, to_order_id).await {
            Ok(_) => {
                tracing::info!(item_id, from_order_id, to_order_id, "moved item");
                Ok(())
            }
            Err(err) => {
                if detached && !self.order_items.revive(from_order_id, item_id).await? {
                    return Err(DomainError::store(format!(
                        "failed to restore relation ({from_order_id}, {item_id}) after move: {err}"
                    )));
                }
                Err(err)
            }
        }
    }

    pub async fn list_all(&self, include_deleted: bool) -> Result<Vec<OrderItem>, DomainError> {
        self.order_items.list(include_deleted).await
    }

    pub async fn items_in_order(
        &self,
        order_id: i32,
        include_deleted: bool,
    ) -> Result<Vec<OrderItem>, DomainError> {
        self.order_items.list_by_order(order_id, include_deleted).await
    }

    pub async fn is_attached(&self, order_id: i32, item_id: i32) -> Result<bool, DomainError> {
        Ok(self
            .order_items
            .find(order_id, item_id, false)
            .await?
            .is_some())
    }
}
