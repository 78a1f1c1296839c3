//! Symmetric-key (HS256) verification and issuance.
//!
//! Used for system-to-system clients and test issuance: the shared secret
//! is known to this process, so the same component can sign tokens for the
//! login boundary.

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;

use crate::domain::{AuthContext, AuthError};
use crate::ports::TokenVerifier;

use super::{context_from_claims, map_jwt_error, Claims, LEEWAY_SECONDS};

#[derive(Clone)]
pub struct HmacAuthenticator {
    issuer: String,
    audience: String,
    secret: Secret<String>,
}

impl HmacAuthenticator {
    pub fn new(
        issuer: impl Into<String>,
        audience: impl Into<String>,
        secret: Secret<String>,
    ) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            secret,
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Sign a token for `subject` with a single scope claim.
    pub fn issue(
        &self,
        subject: &str,
        scope: &str,
        ttl_seconds: i64,
    ) -> Result<String, AuthError> {
        #[derive(Serialize)]
        struct IssuedClaims<'a> {
            iss: &'a str,
            sub: &'a str,
            aud: Vec<&'a str>,
            scope: &'a str,
            iat: i64,
            exp: i64,
        }

        let now = Utc::now().timestamp();
        let claims = IssuedClaims {
            iss: &self.issuer,
            sub: subject,
            aud: vec![&self.audience],
            scope,
            iat: now,
            exp: now + ttl_seconds,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.expose_secret().as_bytes()),
        )
        .map_err(|e| AuthError::InvalidToken(format!("failed to sign token: {e}")))
    }
}

#[async_trait]
impl TokenVerifier for HmacAuthenticator {
    async fn verify(&self, token: &str) -> Result<AuthContext, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = LEEWAY_SECONDS;
        validation.validate_nbf = true;
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.set_required_spec_claims(&["exp", "iss"]);

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.expose_secret().as_bytes()),
            &validation,
        )
        .map_err(map_jwt_error)?;

        // jsonwebtoken already checked the audience; re-check so the rule
        // survives any future change to the validation setup.
        if !data.claims.aud.contains(&self.audience) {
            return Err(AuthError::AudienceMismatch);
        }

        Ok(context_from_claims(&data.claims, &self.audience))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authenticator(secret: &str) -> HmacAuthenticator {
        HmacAuthenticator::new(
            "system-client",
            "ws-service",
            Secret::new(secret.to_string()),
        )
    }

    #[tokio::test]
    async fn issue_then_verify_round_trips_claims() {
        let auth = authenticator("0123456789abcdef0123456789abcdef");
        let token = auth.issue("alice", "ADMIN", 3600).unwrap();

        let ctx = auth.verify(&token).await.unwrap();
        assert_eq!(ctx.issuer, "system-client");
        assert_eq!(ctx.subject, "alice");
        assert_eq!(ctx.audience, "ws-service");
        assert!(ctx.has_scope("ADMIN"));
        assert!(ctx.expires_at > Utc::now());
    }

    #[tokio::test]
    async fn wrong_key_fails_verification() {
        let signer = authenticator("0123456789abcdef0123456789abcdef");
        let verifier = authenticator("fedcba9876543210fedcba9876543210");

        let token = signer.issue("alice", "USER", 3600).unwrap();
        assert!(verifier.verify(&token).await.is_err());
    }

    #[tokio::test]
    async fn expired_beyond_leeway_is_rejected() {
        let auth = authenticator("0123456789abcdef0123456789abcdef");
        // Expired 10 minutes ago, past the 300s allowance.
        let token = auth.issue("alice", "USER", -600).unwrap();
        assert!(matches!(
            auth.verify(&token).await,
            Err(AuthError::TokenExpired)
        ));
    }

    #[tokio::test]
    async fn expired_within_leeway_is_accepted() {
        let auth = authenticator("0123456789abcdef0123456789abcdef");
        let token = auth.issue("alice", "USER", -60).unwrap();
        assert!(auth.verify(&token).await.is_ok());
    }

    #[tokio::test]
    async fn wrong_audience_is_rejected() {
        let signer = HmacAuthenticator::new(
            "system-client",
            "other-service",
            Secret::new("0123456789abcdef0123456789abcdef".to_string()),
        );
        let verifier = authenticator("0123456789abcdef0123456789abcdef");

        let token = signer.issue("alice", "USER", 3600).unwrap();
        assert!(verifier.verify(&token).await.is_err());
    }
}
