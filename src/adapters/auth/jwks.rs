//! Asymmetric verification against a remote key set.
//!
//! Keys are fetched from the identity provider's well-known endpoint on
//! first use and cached; there is no local issuance in this mode. The
//! verification rules match the symmetric mode: signature, temporal claims
//! with leeway, issuer, audience.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use tokio::sync::RwLock;

use crate::domain::{AuthContext, AuthError};
use crate::ports::TokenVerifier;

use super::{context_from_claims, map_jwt_error, Claims, LEEWAY_SECONDS};

/// Configuration for one remote issuer.
#[derive(Debug, Clone)]
pub struct JwksConfig {
    /// Expected issuer claim, also used for key-set discovery.
    pub issuer: String,
    /// Expected audience claim.
    pub audience: String,
    /// Key-set endpoint. Defaults to `<issuer>/.well-known/jwks.json`.
    pub jwks_url: Option<String>,
    /// How long fetched keys stay cached. Defaults to one hour.
    pub cache_duration: Option<Duration>,
}

impl JwksConfig {
    pub fn new(issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            jwks_url: None,
            cache_duration: None,
        }
    }

    fn jwks_url(&self) -> String {
        self.jwks_url.clone().unwrap_or_else(|| {
            format!("{}/.well-known/jwks.json", self.issuer.trim_end_matches('/'))
        })
    }
}

struct CachedKeys {
    jwks: JwkSet,
    fetched_at: Instant,
    ttl: Duration,
}

impl CachedKeys {
    fn is_expired(&self) -> bool {
        self.fetched_at.elapsed() > self.ttl
    }
}

pub struct RemoteJwksVerifier {
    config: JwksConfig,
    http: reqwest::Client,
    cache: Arc<RwLock<Option<CachedKeys>>>,
}

impl RemoteJwksVerifier {
    pub fn new(config: JwksConfig) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AuthError::KeySetUnavailable(e.to_string()))?;
        Ok(Self {
            config,
            http,
            cache: Arc::new(RwLock::new(None)),
        })
    }

    pub fn issuer(&self) -> &str {
        &self.config.issuer
    }

    async fn fetch_jwks(&self) -> Result<JwkSet, AuthError> {
        let url = self.config.jwks_url();
        tracing::debug!(%url, "fetching remote key set");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| AuthError::KeySetUnavailable(e.to_string()))?;
        if !response.status().is_success() {
            return Err(AuthError::KeySetUnavailable(format!(
                "key-set endpoint returned {}",
                response.status()
            )));
        }
        response
            .json::<JwkSet>()
            .await
            .map_err(|e| AuthError::KeySetUnavailable(e.to_string()))
    }

    async fn get_jwks(&self) -> Result<JwkSet, AuthError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if !cached.is_expired() {
                    return Ok(cached.jwks.clone());
                }
            }
        }

        let jwks = self.fetch_jwks().await?;
        let mut cache = self.cache.write().await;
        *cache = Some(CachedKeys {
            jwks: jwks.clone(),
            fetched_at: Instant::now(),
            ttl: self
                .config
                .cache_duration
                .unwrap_or(Duration::from_secs(3600)),
        });
        Ok(jwks)
    }

    fn find_decoding_key(
        &self,
        header: &jsonwebtoken::Header,
        jwks: &JwkSet,
    ) -> Result<(DecodingKey, Algorithm), AuthError> {
        let kid = header
            .kid
            .as_ref()
            .ok_or_else(|| AuthError::InvalidToken("missing kid header".to_string()))?;
        let jwk = jwks
            .find(kid)
            .ok_or_else(|| AuthError::InvalidToken(format!("no key for kid {kid}")))?;

        let algorithm = match jwk.common.key_algorithm {
            Some(jsonwebtoken::jwk::KeyAlgorithm::RS256) | None => Algorithm::RS256,
            Some(jsonwebtoken::jwk::KeyAlgorithm::RS384) => Algorithm::RS384,
            Some(jsonwebtoken::jwk::KeyAlgorithm::RS512) => Algorithm::RS512,
            Some(jsonwebtoken::jwk::KeyAlgorithm::ES256) => Algorithm::ES256,
            Some(jsonwebtoken::jwk::KeyAlgorithm::ES384) => Algorithm::ES384,
            Some(other) => {
                return Err(AuthError::InvalidToken(format!(
                    "unsupported algorithm {other:?}"
                )))
            }
        };

        let key = DecodingKey::from_jwk(jwk)
            .map_err(|e| AuthError::InvalidToken(format!("bad jwk: {e}")))?;
        Ok((key, algorithm))
    }
}

#[async_trait]
impl TokenVerifier for RemoteJwksVerifier {
    async fn verify(&self, token: &str) -> Result<AuthContext, AuthError> {
        let header =
            decode_header(token).map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        let jwks = self.get_jwks().await?;
        let (key, algorithm) = self.find_decoding_key(&header, &jwks)?;

        let mut validation = Validation::new(algorithm);
        validation.leeway = LEEWAY_SECONDS;
        validation.validate_nbf = true;
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);
        validation.set_required_spec_claims(&["exp", "iss"]);

        let data = decode::<Claims>(token, &key, &validation).map_err(map_jwt_error)?;

        if data.claims.iss != self.config.issuer {
            return Err(AuthError::InvalidToken("issuer mismatch".to_string()));
        }
        if !data.claims.aud.contains(&self.config.audience) {
            return Err(AuthError::AudienceMismatch);
        }

        Ok(context_from_claims(&data.claims, &self.config.audience))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builds_well_known_url() {
        let config = JwksConfig::new("https://id.example.com/realms/app/", "ws-service");
        assert_eq!(
            config.jwks_url(),
            "https://id.example.com/realms/app/.well-known/jwks.json"
        );
    }

    #[test]
    fn config_prefers_explicit_url() {
        let mut config = JwksConfig::new("https://id.example.com", "ws-service");
        config.jwks_url = Some("https://id.example.com/certs".to_string());
        assert_eq!(config.jwks_url(), "https://id.example.com/certs");
    }

    #[test]
    fn cache_expires_after_ttl() {
        let cached = CachedKeys {
            jwks: JwkSet { keys: vec![] },
            fetched_at: Instant::now() - Duration::from_secs(2),
            ttl: Duration::from_secs(1),
        };
        assert!(cached.is_expired());
    }
}
