//! Token verification adapters.
//!
//! Two modes share the [`TokenVerifier`] contract:
//!
//! - [`HmacAuthenticator`] — a locally-held symmetric key (HS256). Also the
//!   only component that can *issue* tokens, for the login boundary and
//!   system-to-system clients.
//! - [`RemoteJwksVerifier`] — asymmetric keys fetched from an identity
//!   provider's well-known key-set endpoint and cached.
//!
//! [`TokenAuthenticator`] fronts both: it peeks the token's issuer claim
//! (unverified — verification happens inside the selected mode) and routes
//! to the matching configuration. An unknown issuer never touches a key.

mod hmac;
mod jwks;

pub use hmac::HmacAuthenticator;
pub use jwks::{JwksConfig, RemoteJwksVerifier};

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

use crate::domain::{AuthContext, AuthError};
use crate::ports::TokenVerifier;

/// Clock-skew allowance applied to `exp` and `nbf`, in seconds.
pub(crate) const LEEWAY_SECONDS: u64 = 300;

/// Issuer-keyed registry of verification configurations.
pub struct TokenAuthenticator {
    by_issuer: HashMap<String, IssuerVerifier>,
}

enum IssuerVerifier {
    Hmac(HmacAuthenticator),
    Jwks(RemoteJwksVerifier),
}

impl TokenAuthenticator {
    pub fn new() -> Self {
        Self {
            by_issuer: HashMap::new(),
        }
    }

    pub fn with_hmac(mut self, verifier: HmacAuthenticator) -> Self {
        self.by_issuer
            .insert(verifier.issuer().to_string(), IssuerVerifier::Hmac(verifier));
        self
    }

    pub fn with_jwks(mut self, verifier: RemoteJwksVerifier) -> Self {
        self.by_issuer
            .insert(verifier.issuer().to_string(), IssuerVerifier::Jwks(verifier));
        self
    }
}

impl Default for TokenAuthenticator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenVerifier for TokenAuthenticator {
    async fn verify(&self, token: &str) -> Result<AuthContext, AuthError> {
        let issuer = peek_issuer(token)?;
        match self.by_issuer.get(&issuer) {
            None => Err(AuthError::UnknownIssuer),
            Some(IssuerVerifier::Hmac(v)) => v.verify(token).await,
            Some(IssuerVerifier::Jwks(v)) => v.verify(token).await,
        }
    }
}

/// Claims both modes care about.
#[derive(Debug, Deserialize)]
pub(crate) struct Claims {
    pub iss: String,
    #[serde(default)]
    pub sub: String,
    #[serde(default)]
    pub aud: Audience,
    pub exp: i64,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub scp: Option<Vec<String>>,
}

/// Audience can be a single string or an array of strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(untagged)]
pub(crate) enum Audience {
    #[default]
    None,
    Single(String),
    Multiple(Vec<String>),
}

impl Audience {
    pub fn contains(&self, expected: &str) -> bool {
        match self {
            Audience::None => false,
            Audience::Single(s) => s == expected,
            Audience::Multiple(v) => v.iter().any(|s| s == expected),
        }
    }
}

/// Scopes come from a space-delimited `scope` string or a `scp` list;
/// neither claim means no scopes.
pub(crate) fn extract_scopes(claims: &Claims) -> HashSet<String> {
    if let Some(scope) = &claims.scope {
        return scope
            .split_whitespace()
            .map(str::to_string)
            .collect();
    }
    if let Some(scp) = &claims.scp {
        return scp.iter().cloned().collect();
    }
    HashSet::new()
}

pub(crate) fn context_from_claims(claims: &Claims, audience: &str) -> AuthContext {
    AuthContext {
        issuer: claims.iss.clone(),
        subject: claims.sub.clone(),
        scopes: extract_scopes(claims),
        audience: audience.to_string(),
        expires_at: expiry(claims.exp),
    }
}

fn expiry(exp: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(exp, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Read the issuer claim without verifying the signature. The result only
/// selects a configuration; nothing is trusted until that configuration's
/// own verification passes.
pub(crate) fn peek_issuer(token: &str) -> Result<String, AuthError> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| AuthError::InvalidToken("not a JWT".to_string()))?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| AuthError::InvalidToken("undecodable payload".to_string()))?;

    #[derive(Deserialize)]
    struct IssOnly {
        iss: Option<String>,
    }
    let claims: IssOnly = serde_json::from_slice(&bytes)
        .map_err(|_| AuthError::InvalidToken("unparseable claims".to_string()))?;
    claims.iss.ok_or(AuthError::UnknownIssuer)
}

/// Map `jsonwebtoken` failures into the domain error.
pub(crate) fn map_jwt_error(err: jsonwebtoken::errors::Error) -> AuthError {
    use jsonwebtoken::errors::ErrorKind;
    match err.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidAudience => AuthError::AudienceMismatch,
        ErrorKind::InvalidIssuer => AuthError::InvalidToken("issuer mismatch".to_string()),
        _ => AuthError::InvalidToken(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn audience_single_and_multiple() {
        assert!(Audience::Single("ws-service".to_string()).contains("ws-service"));
        assert!(Audience::Multiple(vec!["a".to_string(), "b".to_string()]).contains("b"));
        assert!(!Audience::None.contains("anything"));
    }

    #[test]
    fn scopes_from_space_delimited_string() {
        let claims = Claims {
            iss: "i".to_string(),
            sub: "s".to_string(),
            aud: Audience::None,
            exp: 0,
            scope: Some("read write".to_string()),
            scp: None,
        };
        let scopes = extract_scopes(&claims);
        assert!(scopes.contains("read") && scopes.contains("write"));
    }

    #[test]
    fn scopes_from_list_claim() {
        let claims = Claims {
            iss: "i".to_string(),
            sub: "s".to_string(),
            aud: Audience::None,
            exp: 0,
            scope: None,
            scp: Some(vec!["admin".to_string()]),
        };
        assert!(extract_scopes(&claims).contains("admin"));
    }

    #[test]
    fn scopes_default_to_empty() {
        let claims = Claims {
            iss: "i".to_string(),
            sub: "s".to_string(),
            aud: Audience::None,
            exp: 0,
            scope: None,
            scp: None,
        };
        assert!(extract_scopes(&claims).is_empty());
    }

    #[test]
    fn peek_issuer_rejects_garbage() {
        assert!(matches!(
            peek_issuer("definitely-not-a-jwt"),
            Err(AuthError::InvalidToken(_))
        ));
    }
}
