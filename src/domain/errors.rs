//! Error taxonomy shared by the services and adapters.
//!
//! No variant here is fatal to the dispatcher worker: every per-job failure
//! is caught at the handler boundary, logged, and answered with silence.

use thiserror::Error;

/// Failures surfaced by the domain services and the store adapters.
#[derive(Debug, Clone, Error)]
pub enum DomainError {
    /// A required payload field is missing or malformed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A referenced id or tag does not resolve to a live row.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// Unique-key collision, invalid foreign key, or an item already held
    /// by another active order.
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// The store itself failed (connectivity, unexpected row shape).
    #[error("store error: {0}")]
    Store(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        DomainError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn constraint(msg: impl Into<String>) -> Self {
        DomainError::Constraint(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        DomainError::Store(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_formats_entity_and_id() {
        let err = DomainError::not_found("Order", 42);
        assert_eq!(err.to_string(), "Order 42 not found");
    }

    #[test]
    fn constraint_carries_message() {
        let err = DomainError::constraint("duplicate tag");
        assert!(err.to_string().contains("duplicate tag"));
    }
}
