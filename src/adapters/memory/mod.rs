//! In-memory Domain Store for tests and local development.
//!
//! One mutex-guarded state implements all six repository ports with the
//! same observable behavior as the PostgreSQL adapters: soft-delete
//! filtering, unique tag/username enforcement, and foreign-key checks on
//! order creation. Locks are held only across synchronous sections.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{
    AppUser, DomainError, Item, ItemRead, Order, OrderItem, Person, PersonRole, Position, UserRole,
};
use crate::ports::{
    ItemReadRepository, ItemRepository, OrderItemRepository, OrderRepository, PersonRepository,
    UserRepository,
};

#[derive(Default)]
struct State {
    people: Vec<Person>,
    users: Vec<AppUser>,
    orders: Vec<Order>,
    items: Vec<Item>,
    order_items: Vec<OrderItem>,
    reads: Vec<ItemRead>,
    next_person_id: i32,
    next_user_id: i32,
    next_order_id: i32,
    next_item_id: i32,
    next_read_id: i32,
}

/// The whole store behind one lock; clone to share.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, DomainError> {
        self.state
            .lock()
            .map_err(|_| DomainError::store("in-memory store lock poisoned"))
    }

    /// Active relation count for an item — handy in invariant assertions.
    pub fn active_relations_for_item(&self, item_id: i32) -> usize {
        self.state
            .lock()
            .map(|s| {
                s.order_items
                    .iter()
                    .filter(|oi| oi.item_id == item_id && !oi.deleted)
                    .count()
            })
            .unwrap_or(0)
    }
}

#[async_trait]
impl PersonRepository for InMemoryStore {
    async fn create(&self, name: &str, role: PersonRole) -> Result<Person, DomainError> {
        let mut state = self.lock()?;
        state.next_person_id += 1;
        let person = Person {
            person_id: state.next_person_id,
            name: name.to_string(),
            role,
            deleted: false,
        };
        state.people.push(person.clone());
        Ok(person)
    }

    async fn read_by_id(
        &self,
        person_id: i32,
        include_deleted: bool,
    ) -> Result<Option<Person>, DomainError> {
        let state = self.lock()?;
        Ok(state
            .people
            .iter()
            .find(|p| p.person_id == person_id && (include_deleted || !p.deleted))
            .cloned())
    }

    async fn list(&self, include_deleted: bool) -> Result<Vec<Person>, DomainError> {
        let state = self.lock()?;
        Ok(state
            .people
            .iter()
            .filter(|p| include_deleted || !p.deleted)
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        person_id: i32,
        name: &str,
        role: PersonRole,
    ) -> Result<bool, DomainError> {
        let mut state = self.lock()?;
        match state
            .people
            .iter_mut()
            .find(|p| p.person_id == person_id && !p.deleted)
        {
            Some(person) => {
                person.name = name.to_string();
                person.role = role;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn soft_delete(&self, person_id: i32) -> Result<bool, DomainError> {
        let mut state = self.lock()?;
        match state
            .people
            .iter_mut()
            .find(|p| p.person_id == person_id && !p.deleted)
        {
            Some(person) => {
                person.deleted = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(
        &self,
        username: &str,
        password_hash: &str,
        salt: &str,
        role: UserRole,
    ) -> Result<AppUser, DomainError> {
        let mut state = self.lock()?;
        if state.users.iter().any(|u| u.username == username) {
            return Err(DomainError::constraint(format!(
                "username '{username}' already taken"
            )));
        }
        state.next_user_id += 1;
        let user = AppUser {
            user_id: state.next_user_id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            salt: salt.to_string(),
            role,
            created_at: Utc::now(),
        };
        state.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, user_id: i32) -> Result<Option<AppUser>, DomainError> {
        let state = self.lock()?;
        Ok(state.users.iter().find(|u| u.user_id == user_id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<AppUser>, DomainError> {
        let state = self.lock()?;
        Ok(state.users.iter().find(|u| u.username == username).cloned())
    }

    async fn list(&self) -> Result<Vec<AppUser>, DomainError> {
        let state = self.lock()?;
        Ok(state.users.clone())
    }

    async fn update_username(&self, user_id: i32, username: &str) -> Result<bool, DomainError> {
        let mut state = self.lock()?;
        if state
            .users
            .iter()
            .any(|u| u.username == username && u.user_id != user_id)
        {
            return Err(DomainError::constraint(format!(
                "username '{username}' already taken"
            )));
        }
        match state.users.iter_mut().find(|u| u.user_id == user_id) {
            Some(user) => {
                user.username = username.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_role(&self, user_id: i32, role: UserRole) -> Result<bool, DomainError> {
        let mut state = self.lock()?;
        match state.users.iter_mut().find(|u| u.user_id == user_id) {
            Some(user) => {
                user.role = role;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_password(
        &self,
        user_id: i32,
        password_hash: &str,
        salt: &str,
    ) -> Result<bool, DomainError> {
        let mut state = self.lock()?;
        match state.users.iter_mut().find(|u| u.user_id == user_id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.salt = salt.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, user_id: i32) -> Result<bool, DomainError> {
        let mut state = self.lock()?;
        let before = state.users.len();
        state.users.retain(|u| u.user_id != user_id);
        Ok(state.users.len() < before)
    }
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn create(
        &self,
        created_date: NaiveDate,
        customer_id: Option<i32>,
        logged_by_id: Option<i32>,
    ) -> Result<Order, DomainError> {
        let mut state = self.lock()?;
        for person_id in [customer_id, logged_by_id].into_iter().flatten() {
            if !state.people.iter().any(|p| p.person_id == person_id) {
                return Err(DomainError::constraint(format!(
                    "person {person_id} does not exist"
                )));
            }
        }
        state.next_order_id += 1;
        let order = Order {
            order_id: state.next_order_id,
            created_date,
            start_date: None,
            end_date: None,
            customer_id,
            logged_by_id,
            deleted: false,
        };
        state.orders.push(order.clone());
        Ok(order)
    }

    async fn read_by_id(
        &self,
        order_id: i32,
        include_deleted: bool,
    ) -> Result<Option<Order>, DomainError> {
        let state = self.lock()?;
        Ok(state
            .orders
            .iter()
            .find(|o| o.order_id == order_id && (include_deleted || !o.deleted))
            .cloned())
    }

    async fn list(&self, include_deleted: bool) -> Result<Vec<Order>, DomainError> {
        let state = self.lock()?;
        Ok(state
            .orders
            .iter()
            .filter(|o| include_deleted || !o.deleted)
            .cloned()
            .collect())
    }

    async fn update_dates(
        &self,
        order_id: i32,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<bool, DomainError> {
        let mut state = self.lock()?;
        match state
            .orders
            .iter_mut()
            .find(|o| o.order_id == order_id && !o.deleted)
        {
            Some(order) => {
                order.start_date = start;
                order.end_date = end;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn soft_delete(&self, order_id: i32) -> Result<bool, DomainError> {
        let mut state = self.lock()?;
        match state
            .orders
            .iter_mut()
            .find(|o| o.order_id == order_id && !o.deleted)
        {
            Some(order) => {
                order.deleted = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl ItemRepository for InMemoryStore {
    async fn create(
        &self,
        tag_id: &str,
        position: Position,
        is_overdue: Option<bool>,
    ) -> Result<Item, DomainError> {
        let mut state = self.lock()?;
        // Tag uniqueness spans deleted rows too.
        if state.items.iter().any(|i| i.tag_id == tag_id) {
            return Err(DomainError::constraint(format!(
                "tag '{tag_id}' already in use"
            )));
        }
        state.next_item_id += 1;
        let item = Item {
            item_id: state.next_item_id,
            tag_id: tag_id.to_string(),
            position,
            is_overdue,
            deleted: false,
        };
        state.items.push(item.clone());
        Ok(item)
    }

    async fn read_by_id(
        &self,
        item_id: i32,
        include_deleted: bool,
    ) -> Result<Option<Item>, DomainError> {
        let state = self.lock()?;
        Ok(state
            .items
            .iter()
            .find(|i| i.item_id == item_id && (include_deleted || !i.deleted))
            .cloned())
    }

    async fn read_by_tag(
        &self,
        tag_id: &str,
        include_deleted: bool,
    ) -> Result<Option<Item>, DomainError> {
        let state = self.lock()?;
        Ok(state
            .items
            .iter()
            .find(|i| i.tag_id == tag_id && (include_deleted || !i.deleted))
            .cloned())
    }

    async fn list(&self, include_deleted: bool) -> Result<Vec<Item>, DomainError> {
        let state = self.lock()?;
        Ok(state
            .items
            .iter()
            .filter(|i| include_deleted || !i.deleted)
            .cloned()
            .collect())
    }

    async fn list_by_order(
        &self,
        order_id: i32,
        include_deleted: bool,
    ) -> Result<Vec<Item>, DomainError> {
        let state = self.lock()?;
        let item_ids: Vec<i32> = state
            .order_items
            .iter()
            .filter(|oi| oi.order_id == order_id && (include_deleted || !oi.deleted))
            .map(|oi| oi.item_id)
            .collect();
        Ok(state
            .items
            .iter()
            .filter(|i| item_ids.contains(&i.item_id) && (include_deleted || !i.deleted))
            .cloned()
            .collect())
    }

    async fn update_position(
        &self,
        item_id: i32,
        position: Position,
    ) -> Result<bool, DomainError> {
        let mut state = self.lock()?;
        match state
            .items
            .iter_mut()
            .find(|i| i.item_id == item_id && !i.deleted)
        {
            Some(item) => {
                item.position = position;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_overdue(&self, item_id: i32, overdue: bool) -> Result<bool, DomainError> {
        let mut state = self.lock()?;
        match state
            .items
            .iter_mut()
            .find(|i| i.item_id == item_id && !i.deleted)
        {
            Some(item) => {
                item.is_overdue = Some(overdue);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn soft_delete(&self, item_id: i32) -> Result<bool, DomainError> {
        let mut state = self.lock()?;
        match state
            .items
            .iter_mut()
            .find(|i| i.item_id == item_id && !i.deleted)
        {
            Some(item) => {
                item.deleted = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl OrderItemRepository for InMemoryStore {
    async fn find(
        &self,
        order_id: i32,
        item_id: i32,
        include_deleted: bool,
    ) -> Result<Option<OrderItem>, DomainError> {
        let state = self.lock()?;
        Ok(state
            .order_items
            .iter()
            .find(|oi| {
                oi.order_id == order_id
                    && oi.item_id == item_id
                    && (include_deleted || !oi.deleted)
            })
            .copied())
    }

    async fn find_active_for_item(
        &self,
        item_id: i32,
    ) -> Result<Option<OrderItem>, DomainError> {
        let state = self.lock()?;
        Ok(state
            .order_items
            .iter()
            .find(|oi| oi.item_id == item_id && !oi.deleted)
            .copied())
    }

    async fn insert(&self, order_id: i32, item_id: i32) -> Result<OrderItem, DomainError> {
        let mut state = self.lock()?;
        if state
            .order_items
            .iter()
            .any(|oi| oi.order_id == order_id && oi.item_id == item_id)
        {
            return Err(DomainError::constraint(format!(
                "relation ({order_id}, {item_id}) already exists"
            )));
        }
        let relation = OrderItem {
            order_id,
            item_id,
            deleted: false,
        };
        state.order_items.push(relation);
        Ok(relation)
    }

    async fn revive(&self, order_id: i32, item_id: i32) -> Result<bool, DomainError> {
        let mut state = self.lock()?;
        match state
            .order_items
            .iter_mut()
            .find(|oi| oi.order_id == order_id && oi.item_id == item_id && oi.deleted)
        {
            Some(relation) => {
                relation.deleted = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn detach(&self, order_id: i32, item_id: i32) -> Result<bool, DomainError> {
        let mut state = self.lock()?;
        match state
            .order_items
            .iter_mut()
            .find(|oi| oi.order_id == order_id && oi.item_id == item_id && !oi.deleted)
        {
            Some(relation) => {
                relation.deleted = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list(&self, include_deleted: bool) -> Result<Vec<OrderItem>, DomainError> {
        let state = self.lock()?;
        Ok(state
            .order_items
            .iter()
            .filter(|oi| include_deleted || !oi.deleted)
            .copied()
            .collect())
    }

    async fn list_by_order(
        &self,
        order_id: i32,
        include_deleted: bool,
    ) -> Result<Vec<OrderItem>, DomainError> {
        let state = self.lock()?;
        Ok(state
            .order_items
            .iter()
            .filter(|oi| oi.order_id == order_id && (include_deleted || !oi.deleted))
            .copied()
            .collect())
    }

    async fn count_active_items(&self, order_id: i32) -> Result<i64, DomainError> {
        let state = self.lock()?;
        Ok(state
            .order_items
            .iter()
            .filter(|oi| oi.order_id == order_id && !oi.deleted)
            .count() as i64)
    }
}

#[async_trait]
impl ItemReadRepository for InMemoryStore {
    async fn insert(
        &self,
        tag_id: &str,
        read_time: DateTime<Utc>,
    ) -> Result<ItemRead, DomainError> {
        let mut state = self.lock()?;
        state.next_read_id += 1;
        let read = ItemRead {
            read_id: state.next_read_id,
            tag_id: tag_id.to_string(),
            read_time,
            deleted: false,
        };
        state.reads.push(read.clone());
        Ok(read)
    }

    async fn read_by_id(
        &self,
        read_id: i32,
        include_deleted: bool,
    ) -> Result<Option<ItemRead>, DomainError> {
        let state = self.lock()?;
        Ok(state
            .reads
            .iter()
            .find(|r| r.read_id == read_id && (include_deleted || !r.deleted))
            .cloned())
    }

    async fn update(
        &self,
        read_id: i32,
        tag_id: &str,
        read_time: DateTime<Utc>,
    ) -> Result<Option<ItemRead>, DomainError> {
        let mut state = self.lock()?;
        match state
            .reads
            .iter_mut()
            .find(|r| r.read_id == read_id && !r.deleted)
        {
            Some(read) => {
                read.tag_id = tag_id.to_string();
                read.read_time = read_time;
                Ok(Some(read.clone()))
            }
            None => Ok(None),
        }
    }

    async fn list(&self, include_deleted: bool) -> Result<Vec<ItemRead>, DomainError> {
        let state = self.lock()?;
        Ok(state
            .reads
            .iter()
            .filter(|r| include_deleted || !r.deleted)
            .cloned()
            .collect())
    }

    async fn list_for_tag_in_range(
        &self,
        tag_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ItemRead>, DomainError> {
        let state = self.lock()?;
        Ok(state
            .reads
            .iter()
            .filter(|r| {
                r.tag_id == tag_id && !r.deleted && r.read_time >= from && r.read_time <= to
            })
            .cloned()
            .collect())
    }

    async fn soft_delete(&self, read_id: i32) -> Result<bool, DomainError> {
        let mut state = self.lock()?;
        match state
            .reads
            .iter_mut()
            .find(|r| r.read_id == read_id && !r.deleted)
        {
            Some(read) => {
                read.deleted = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn item_create_rejects_duplicate_tag_even_after_delete() {
        let store = InMemoryStore::new();
        let item = ItemRepository::create(&store, "TAG-1", Position::Home, None)
            .await
            .unwrap();
        ItemRepository::soft_delete(&store, item.item_id).await.unwrap();

        let err = ItemRepository::create(&store, "TAG-1", Position::Home, None).await;
        assert!(matches!(err, Err(DomainError::Constraint(_))));
    }

    #[tokio::test]
    async fn soft_deleted_rows_hide_from_default_reads() {
        let store = InMemoryStore::new();
        let person = PersonRepository::create(&store, "Ada", PersonRole::Customer)
            .await
            .unwrap();
        PersonRepository::soft_delete(&store, person.person_id)
            .await
            .unwrap();

        assert!(PersonRepository::read_by_id(&store, person.person_id, false)
            .await
            .unwrap()
            .is_none());
        assert!(PersonRepository::read_by_id(&store, person.person_id, true)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn order_create_checks_foreign_keys() {
        let store = InMemoryStore::new();
        let err =
            OrderRepository::create(&store, Utc::now().date_naive(), Some(99), None).await;
        assert!(matches!(err, Err(DomainError::Constraint(_))));
    }
}
