//! PostgreSQL person repository.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::{DomainError, Person, PersonRole};
use crate::ports::PersonRepository;

use super::{map_create_err, map_err};

#[derive(Clone)]
pub struct PostgresPersonRepository {
    pool: PgPool,
}

impl PostgresPersonRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_row(row: &PgRow) -> Result<Person, DomainError> {
    let role: String = row.try_get("role").map_err(|e| map_err(e, "person.role"))?;
    Ok(Person {
        person_id: row.try_get("person_id").map_err(|e| map_err(e, "person"))?,
        name: row.try_get("name").map_err(|e| map_err(e, "person"))?,
        role: PersonRole::parse(&role)
            .ok_or_else(|| DomainError::store(format!("unknown person role '{role}'")))?,
        deleted: row.try_get("deleted").map_err(|e| map_err(e, "person"))?,
    })
}

#[async_trait]
impl PersonRepository for PostgresPersonRepository {
    async fn create(&self, name: &str, role: PersonRole) -> Result<Person, DomainError> {
        let row = sqlx::query(
            r#"
            INSERT INTO people (name, role, deleted)
            VALUES ($1, $2, FALSE)
            RETURNING person_id, name, role, deleted
            "#,
        )
        .bind(name)
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_create_err(e, "create person"))?;
        map_row(&row)
    }

    async fn read_by_id(
        &self,
        person_id: i32,
        include_deleted: bool,
    ) -> Result<Option<Person>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT person_id, name, role, deleted
            FROM people
            WHERE person_id = $1 AND (deleted = FALSE OR $2)
            "#,
        )
        .bind(person_id)
        .bind(include_deleted)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_err(e, "read person"))?;
        row.as_ref().map(map_row).transpose()
    }

    async fn list(&self, include_deleted: bool) -> Result<Vec<Person>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT person_id, name, role, deleted
            FROM people
            WHERE deleted = FALSE OR $1
            ORDER BY person_id
            "#,
        )
        .bind(include_deleted)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_err(e, "list people"))?;
        rows.iter().map(map_row).collect()
    }

    async fn update(
        &self,
        person_id: i32,
        name: &str,
        role: PersonRole,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE people SET name = $2, role = $3
            WHERE person_id = $1 AND deleted = FALSE
            "#,
        )
        .bind(person_id)
        .bind(name)
        .bind(role.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| map_err(e, "update person"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn soft_delete(&self, person_id: i32) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE people SET deleted = TRUE
            WHERE person_id = $1 AND deleted = FALSE
            "#,
        )
        .bind(person_id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_err(e, "delete person"))?;
        Ok(result.rows_affected() > 0)
    }
}
