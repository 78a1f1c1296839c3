//! PostgreSQL implementations of the Domain Store ports.
//!
//! Runtime `sqlx::query` over the legacy tables (people, users, orders,
//! items, order_items, item_reads). Schema DDL and migrations are managed
//! outside this crate; connectivity is probed at process start and a
//! failure there is fatal.

mod item_read_repository;
mod item_repository;
mod order_item_repository;
mod order_repository;
mod person_repository;
mod user_repository;

pub use item_read_repository::PostgresItemReadRepository;
pub use item_repository::PostgresItemRepository;
pub use order_item_repository::PostgresOrderItemRepository;
pub use order_repository::PostgresOrderRepository;
pub use person_repository::PostgresPersonRepository;
pub use user_repository::PostgresUserRepository;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::domain::DomainError;

/// Connect and probe the database. The caller treats an error here as
/// fatal: the process must not run with an unusable store.
pub async fn connect(url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await?;
    sqlx::query("SELECT 1").execute(&pool).await?;
    Ok(pool)
}

/// Map a store failure, promoting unique/foreign-key violations to the
/// constraint taxonomy the services translate.
pub(crate) fn map_create_err(err: sqlx::Error, what: &str) -> DomainError {
    if let sqlx::Error::Database(db) = &err {
        match db.kind() {
            sqlx::error::ErrorKind::UniqueViolation => {
                return DomainError::constraint(format!("{what}: unique violation"));
            }
            sqlx::error::ErrorKind::ForeignKeyViolation => {
                return DomainError::constraint(format!("{what}: invalid reference"));
            }
            _ => {}
        }
    }
    DomainError::store(format!("{what}: {err}"))
}

pub(crate) fn map_err(err: sqlx::Error, what: &str) -> DomainError {
    DomainError::store(format!("{what}: {err}"))
}
