//! Application accounts used by the desktop client and the login boundary.

use chrono::{DateTime, Utc};

/// Role attached to an application account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    Admin,
    User,
}

impl UserRole {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ADMIN" => Some(UserRole::Admin),
            "USER" => Some(UserRole::User),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::User => "USER",
        }
    }
}

/// An application account.
///
/// The password is only ever held as an argon2 PHC hash; the plaintext never
/// reaches the domain layer or the wire. `AppUser` is the one entity with
/// hard deletion (administrative removal).
#[derive(Debug, Clone)]
pub struct AppUser {
    pub user_id: i32,
    pub username: String,
    pub password_hash: String,
    pub salt: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_role_rejects_person_only_roles() {
        assert_eq!(UserRole::parse("DRIVER"), None);
        assert_eq!(UserRole::parse("admin"), Some(UserRole::Admin));
    }
}
