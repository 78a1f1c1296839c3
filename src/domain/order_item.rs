//! The order ↔ item relation.

/// One attachment of an item to an order, keyed by `(order_id, item_id)`.
///
/// Invariant enforced by the order-item service: at most one **active**
/// (`deleted = false`) relation may reference any item at a time, no matter
/// which order holds it. Detaching soft-deletes the row; re-attaching the
/// same pair revives it instead of inserting a duplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderItem {
    pub order_id: i32,
    pub item_id: i32,
    pub deleted: bool,
}

impl OrderItem {
    pub fn active(&self) -> bool {
        !self.deleted
    }
}
