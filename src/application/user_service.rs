//! Account registration and credential checks.
//!
//! Passwords are hashed with argon2; the plaintext is dropped at this
//! boundary and never stored or sent anywhere.

use std::sync::Arc;

use argon2::password_hash::{PasswordHash, PasswordHasher, SaltString};
use argon2::{Argon2, PasswordVerifier};
use rand_core::OsRng;

use crate::domain::{AppUser, DomainError, UserRole};
use crate::ports::UserRepository;

pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Register a new account. The username must be unused.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        role: UserRole,
    ) -> Result<AppUser, DomainError> {
        if username.trim().is_empty() {
            return Err(DomainError::validation("username must not be blank"));
        }
        if password.is_empty() {
            return Err(DomainError::validation("password must not be blank"));
        }
        if self.users.find_by_username(username).await?.is_some() {
            return Err(DomainError::constraint(format!(
                "user '{username}' already exists"
            )));
        }

        let (hash, salt) = hash_password(password)?;
        self.users.create(username, &hash, &salt, role).await
    }

    /// Check a plaintext password against the stored hash. Unknown users
    /// and wrong passwords both come back as plain `false`.
    pub async fn verify_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<bool, DomainError> {
        let Some(user) = self.users.find_by_username(username).await? else {
            return Ok(false);
        };
        let parsed = PasswordHash::new(&user.password_hash)
            .map_err(|e| DomainError::store(format!("corrupt password hash: {e}")))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<AppUser>, DomainError> {
        self.users.find_by_username(username).await
    }

    pub async fn list_all(&self) -> Result<Vec<AppUser>, DomainError> {
        self.users.list().await
    }

    pub async fn update_username(
        &self,
        user_id: i32,
        username: &str,
    ) -> Result<bool, DomainError> {
        if username.trim().is_empty() {
            return Err(DomainError::validation("username must not be blank"));
        }
        self.users.update_username(user_id, username).await
    }

    pub async fn update_role(&self, user_id: i32, role: UserRole) -> Result<bool, DomainError> {
        self.users.update_role(user_id, role).await
    }

    pub async fn update_password(
        &self,
        user_id: i32,
        password: &str,
    ) -> Result<bool, DomainError> {
        if password.is_empty() {
            return Err(DomainError::validation("password must not be blank"));
        }
        let (hash, salt) = hash_password(password)?;
        self.users.update_password(user_id, &hash, &salt).await
    }

    pub async fn get_by_id(&self, user_id: i32) -> Result<Option<AppUser>, DomainError> {
        self.users.find_by_id(user_id).await
    }

    /// Hard delete — the one administrative removal in the system.
    pub async fn delete_user(&self, user_id: i32) -> Result<bool, DomainError> {
        self.users.delete(user_id).await
    }
}

fn hash_password(password: &str) -> Result<(String, String), DomainError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| DomainError::store(format!("password hashing failed: {e}")))?
        .to_string();
    Ok((hash, salt.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_password_produces_verifiable_phc_string() {
        let (hash, salt) = hash_password("hunter2").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(!salt.is_empty());

        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(Argon2::default()
            .verify_password(b"hunter2", &parsed)
            .is_ok());
        assert!(Argon2::default()
            .verify_password(b"wrong", &parsed)
            .is_err());
    }
}
