//! Application-account store contract.
//!
//! The one repository with hard deletion: accounts are administratively
//! removed, not soft-deleted.

use async_trait::async_trait;

use crate::domain::{AppUser, DomainError, UserRole};

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with [`DomainError::Constraint`] on a duplicate username.
    async fn create(
        &self,
        username: &str,
        password_hash: &str,
        salt: &str,
        role: UserRole,
    ) -> Result<AppUser, DomainError>;

    async fn find_by_id(&self, user_id: i32) -> Result<Option<AppUser>, DomainError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<AppUser>, DomainError>;

    async fn list(&self) -> Result<Vec<AppUser>, DomainError>;

    async fn update_username(&self, user_id: i32, username: &str) -> Result<bool, DomainError>;

    async fn update_role(&self, user_id: i32, role: UserRole) -> Result<bool, DomainError>;

    async fn update_password(
        &self,
        user_id: i32,
        password_hash: &str,
        salt: &str,
    ) -> Result<bool, DomainError>;

    /// Hard delete.
    async fn delete(&self, user_id: i32) -> Result<bool, DomainError>;
}
