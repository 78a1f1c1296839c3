//! Person store contract.

use async_trait::async_trait;

use crate::domain::{DomainError, Person, PersonRole};

#[async_trait]
pub trait PersonRepository: Send + Sync {
    async fn create(&self, name: &str, role: PersonRole) -> Result<Person, DomainError>;

    async fn read_by_id(
        &self,
        person_id: i32,
        include_deleted: bool,
    ) -> Result<Option<Person>, DomainError>;

    async fn list(&self, include_deleted: bool) -> Result<Vec<Person>, DomainError>;

    /// Returns `false` when no live row matched.
    async fn update(
        &self,
        person_id: i32,
        name: &str,
        role: PersonRole,
    ) -> Result<bool, DomainError>;

    async fn soft_delete(&self, person_id: i32) -> Result<bool, DomainError>;
}
