//! Authentication types extracted from a verified token.
//!
//! `AuthContext` is a **domain type** with no provider dependencies: the
//! HMAC and remote key-set verifiers both populate it through the
//! `TokenVerifier` port. It is owned by the connection that produced it and
//! discarded on disconnect; it is never persisted.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Verified identity and claims, scoped to one connection's lifetime.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Issuer the token was verified against.
    pub issuer: String,
    /// Subject claim (username or system client id).
    pub subject: String,
    /// Scopes granted to the subject.
    pub scopes: HashSet<String>,
    /// Audience the verifying configuration expects.
    pub audience: String,
    /// Expiry of the underlying token.
    pub expires_at: DateTime<Utc>,
}

impl AuthContext {
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.contains(scope)
    }
}

/// Token verification failures.
///
/// Callers only need the single `AuthError` type; the variants exist so the
/// gateway can log *why* a handshake was refused.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// The issuer claim matches no configured verifier.
    #[error("unknown issuer")]
    UnknownIssuer,

    /// Malformed token, bad signature, or failed standard claim checks.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// Expired beyond the clock-skew allowance.
    #[error("token expired")]
    TokenExpired,

    /// None of the token's audience values match the expected audience.
    #[error("audience mismatch")]
    AudienceMismatch,

    /// The remote key set could not be fetched or parsed.
    #[error("key set unavailable: {0}")]
    KeySetUnavailable(String),

    /// This verifier is not configured to issue tokens.
    #[error("issuance not configured for this verifier")]
    IssuanceUnavailable,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn auth_context_scope_lookup() {
        let ctx = AuthContext {
            issuer: "system-client".to_string(),
            subject: "alice".to_string(),
            scopes: ["ADMIN".to_string()].into_iter().collect(),
            audience: "ws-service".to_string(),
            expires_at: Utc::now() + Duration::hours(1),
        };
        assert!(ctx.has_scope("ADMIN"));
        assert!(!ctx.has_scope("USER"));
    }
}
