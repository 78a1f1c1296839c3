//! Domain services: one per entity family.
//!
//! Services enforce the business rules (date ordering, duplicate-scan
//! suppression, attach/detach invariants) on top of the repository ports.
//! They never cache entities beyond a single operation, and every mutating
//! call is reachable only from the dispatcher worker.

mod item_read_service;
mod item_service;
mod order_item_service;
mod order_service;
mod person_service;
mod user_service;

pub use item_read_service::ItemReadService;
pub use item_service::ItemService;
pub use order_item_service::OrderItemService;
pub use order_service::OrderService;
pub use person_service::PersonService;
pub use user_service::UserService;

use std::sync::Arc;

use crate::ports::{
    ItemReadRepository, ItemRepository, OrderItemRepository, OrderRepository, PersonRepository,
    UserRepository,
};

/// The full set of domain services, wired over one store.
pub struct Services {
    pub orders: OrderService,
    pub items: ItemService,
    pub order_items: OrderItemService,
    pub item_reads: ItemReadService,
    pub people: PersonService,
    pub users: UserService,
}

impl Services {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        items: Arc<dyn ItemRepository>,
        order_items: Arc<dyn OrderItemRepository>,
        item_reads: Arc<dyn ItemReadRepository>,
        people: Arc<dyn PersonRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            orders: OrderService::new(orders.clone()),
            items: ItemService::new(items.clone()),
            order_items: OrderItemService::new(orders, items.clone(), order_items),
            item_reads: ItemReadService::new(items, item_reads),
            people: PersonService::new(people),
            users: UserService::new(users),
        }
    }
}
