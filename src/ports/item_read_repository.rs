//! Scan-log store contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{DomainError, ItemRead};

#[async_trait]
pub trait ItemReadRepository: Send + Sync {
    async fn insert(
        &self,
        tag_id: &str,
        read_time: DateTime<Utc>,
    ) -> Result<ItemRead, DomainError>;

    async fn read_by_id(
        &self,
        read_id: i32,
        include_deleted: bool,
    ) -> Result<Option<ItemRead>, DomainError>;

    /// Rewrite tag and time of an existing row; `None` when no live row
    /// matched.
    async fn update(
        &self,
        read_id: i32,
        tag_id: &str,
        read_time: DateTime<Utc>,
    ) -> Result<Option<ItemRead>, DomainError>;

    async fn list(&self, include_deleted: bool) -> Result<Vec<ItemRead>, DomainError>;

    async fn list_for_tag_in_range(
        &self,
        tag_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<ItemRead>, DomainError>;

    async fn soft_delete(&self, read_id: i32) -> Result<bool, DomainError>;
}
