//! PostgreSQL account repository. Hard deletion only.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::{AppUser, DomainError, UserRole};
use crate::ports::UserRepository;

use super::{map_create_err, map_err};

#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str = "user_id, username, password_hash, salt, role, created_at";

fn map_row(row: &PgRow) -> Result<AppUser, DomainError> {
    let role: String = row.try_get("role").map_err(|e| map_err(e, "user.role"))?;
    Ok(AppUser {
        user_id: row.try_get("user_id").map_err(|e| map_err(e, "user"))?,
        username: row.try_get("username").map_err(|e| map_err(e, "user"))?,
        password_hash: row
            .try_get("password_hash")
            .map_err(|e| map_err(e, "user"))?,
        salt: row.try_get("salt").map_err(|e| map_err(e, "user"))?,
        role: UserRole::parse(&role)
            .ok_or_else(|| DomainError::store(format!("unknown user role '{role}'")))?,
        created_at: row.try_get("created_at").map_err(|e| map_err(e, "user"))?,
    })
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(
        &self,
        username: &str,
        password_hash: &str,
        salt: &str,
        role: UserRole,
    ) -> Result<AppUser, DomainError> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO users (username, password_hash, salt, role, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING {COLUMNS}
            "#
        ))
        .bind(username)
        .bind(password_hash)
        .bind(salt)
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_create_err(e, "create user"))?;
        map_row(&row)
    }

    async fn find_by_id(&self, user_id: i32) -> Result<Option<AppUser>, DomainError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM users WHERE user_id = $1"))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_err(e, "find user"))?;
        row.as_ref().map(map_row).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<AppUser>, DomainError> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM users WHERE username = $1"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_err(e, "find user"))?;
        row.as_ref().map(map_row).transpose()
    }

    async fn list(&self) -> Result<Vec<AppUser>, DomainError> {
        let rows = sqlx::query(&format!("SELECT {COLUMNS} FROM users ORDER BY user_id"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_err(e, "list users"))?;
        rows.iter().map(map_row).collect()
    }

    async fn update_username(&self, user_id: i32, username: &str) -> Result<bool, DomainError> {
        let result = sqlx::query("UPDATE users SET username = $2 WHERE user_id = $1")
            .bind(user_id)
            .bind(username)
            .execute(&self.pool)
            .await
            .map_err(|e| map_create_err(e, "update username"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_role(&self, user_id: i32, role: UserRole) -> Result<bool, DomainError> {
        let result = sqlx::query("UPDATE users SET role = $2 WHERE user_id = $1")
            .bind(user_id)
            .bind(role.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| map_err(e, "update role"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn update_password(
        &self,
        user_id: i32,
        password_hash: &str,
        salt: &str,
    ) -> Result<bool, DomainError> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, salt = $3 WHERE user_id = $1")
                .bind(user_id)
                .bind(password_hash)
                .bind(salt)
                .execute(&self.pool)
                .await
                .map_err(|e| map_err(e, "update password"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, user_id: i32) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_err(e, "delete user"))?;
        Ok(result.rows_affected() > 0)
    }
}
