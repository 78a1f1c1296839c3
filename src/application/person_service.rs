//! Person management.

use std::sync::Arc;

use crate::domain::{DomainError, Person, PersonRole};
use crate::ports::PersonRepository;

pub struct PersonService {
    people: Arc<dyn PersonRepository>,
}

impl PersonService {
    pub fn new(people: Arc<dyn PersonRepository>) -> Self {
        Self { people }
    }

    pub async fn create_person(&self, name: &str, role: PersonRole) -> Result<Person, DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::validation("name must not be blank"));
        }
        self.people.create(name, role).await
    }

    pub async fn update_person(
        &self,
        person_id: i32,
        name: &str,
        role: PersonRole,
    ) -> Result<Option<Person>, DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::validation("name must not be blank"));
        }
        if !self.people.update(person_id, name, role).await? {
            return Ok(None);
        }
        self.people.read_by_id(person_id, true).await
    }

    pub async fn get_person(
        &self,
        person_id: i32,
        include_deleted: bool,
    ) -> Result<Option<Person>, DomainError> {
        self.people.read_by_id(person_id, include_deleted).await
    }

    pub async fn list_people(&self) -> Result<Vec<Person>, DomainError> {
        self.people.list(false).await
    }

    pub async fn remove_person(&self, person_id: i32) -> Result<bool, DomainError> {
        self.people.soft_delete(person_id).await
    }
}
