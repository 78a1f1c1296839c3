//! User.* wire handlers.
//!
//! Passwords arrive only inside `User.Create`/`User.Update` payloads and
//! are handed straight to the user service for hashing. No outbound
//! message ever carries a hash.

use serde_json::{json, Value};

use crate::application::Services;
use crate::dispatch::Envelope;
use crate::domain::{AppUser, UserRole};

use super::{opt_str, require_id, soften, HandlerResult};

/// In: `User.List` — Out: `User.Snapshot`.
pub async fn list(services: &Services) -> HandlerResult {
    let users = match services.users.list_all().await {
        Ok(users) => users,
        Err(err) => return soften(err, "User.List"),
    };
    let rows: Vec<Value> = users.iter().map(user_json).collect();
    Ok(Some(Envelope::build(
        "User.Snapshot",
        json!({ "orders": rows }),
    )))
}

/// In: `User.Create` / `User.Update` — Out: `User.Upsert`.
pub async fn upsert(services: &Services, payload: &Value, create: bool) -> HandlerResult {
    let user = if create {
        let Some(username) = opt_str(payload, "username").filter(|u| !u.trim().is_empty()) else {
            tracing::warn!("missing username in User.Create payload");
            return Ok(None);
        };
        let Some(password) = opt_str(payload, "password").filter(|p| !p.is_empty()) else {
            tracing::warn!("missing password in User.Create payload");
            return Ok(None);
        };
        let role = opt_str(payload, "role")
            .and_then(UserRole::parse)
            .unwrap_or(UserRole::User);

        match services.users.register(username, password, role).await {
            Ok(user) => user,
            Err(err) => return soften(err, "User.Create"),
        }
    } else {
        let Some(user_id) = require_id(payload, "userId", "User.Update") else {
            return Ok(None);
        };
        if let Some(username) = opt_str(payload, "username").filter(|u| !u.trim().is_empty()) {
            if let Err(err) = services.users.update_username(user_id, username).await {
                return soften(err, "User.Update");
            }
        }
        if let Some(role) = opt_str(payload, "role").and_then(UserRole::parse) {
            if let Err(err) = services.users.update_role(user_id, role).await {
                return soften(err, "User.Update");
            }
        }
        if let Some(password) = opt_str(payload, "password").filter(|p| !p.is_empty()) {
            if let Err(err) = services.users.update_password(user_id, password).await {
                return soften(err, "User.Update");
            }
        }
        match services.users.get_by_id(user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                tracing::warn!(user_id, "user not found after update");
                return Ok(None);
            }
            Err(err) => return soften(err, "User.Update"),
        }
    };

    Ok(Some(Envelope::build("User.Upsert", user_json(&user))))
}

/// In: `User.Delete` — Out: `User.Deleted`. Hard removal.
pub async fn delete(services: &Services, payload: &Value) -> HandlerResult {
    let Some(user_id) = require_id(payload, "userId", "User.Delete") else {
        return Ok(None);
    };
    match services.users.delete_user(user_id).await {
        Ok(true) => Ok(Some(Envelope::build(
            "User.Deleted",
            json!({ "userId": user_id }),
        ))),
        Ok(false) => {
            tracing::warn!(user_id, "failed to delete user");
            Ok(None)
        }
        Err(err) => soften(err, "User.Delete"),
    }
}

fn user_json(user: &AppUser) -> Value {
    json!({
        "userId": user.user_id,
        "username": user.username,
        "role": user.role.as_str(),
    })
}
