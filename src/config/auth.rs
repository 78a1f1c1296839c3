//! Token authenticator configuration.
//!
//! The symmetric issuer/audience/secret triple is always present — it backs
//! the login boundary and system clients. A remote identity provider is
//! optional and adds a second verifying configuration keyed by its issuer.

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use super::ConfigError;

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_issuer")]
    pub issuer: String,
    #[serde(default = "default_audience")]
    pub audience: String,
    /// HS256 signing secret. At least 32 bytes.
    pub secret: Secret<String>,

    /// Optional federated issuer (asymmetric mode, no issuance).
    #[serde(default)]
    pub remote_issuer: Option<String>,
    #[serde(default)]
    pub remote_audience: Option<String>,
    #[serde(default)]
    pub remote_jwks_url: Option<String>,
}

fn default_issuer() -> String {
    "system-client".to_string()
}

fn default_audience() -> String {
    "ws-service".to_string()
}

impl AuthConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.expose_secret().len() < 32 {
            return Err(ConfigError::invalid(
                "auth.secret must be at least 32 bytes",
            ));
        }
        if self.remote_issuer.is_some() != self.remote_audience.is_some() {
            return Err(ConfigError::invalid(
                "auth.remote_issuer and auth.remote_audience must be set together",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> AuthConfig {
        AuthConfig {
            issuer: default_issuer(),
            audience: default_audience(),
            secret: Secret::new("e3f7a9c4b8d1f0a2c6e9d4b3f7a8c1e2".to_string()),
            remote_issuer: None,
            remote_audience: None,
            remote_jwks_url: None,
        }
    }

    #[test]
    fn accepts_long_enough_secret() {
        assert!(base().validate().is_ok());
    }

    #[test]
    fn rejects_short_secret() {
        let mut config = base();
        config.secret = Secret::new("too-short".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn remote_issuer_requires_audience() {
        let mut config = base();
        config.remote_issuer = Some("https://id.example.com".to_string());
        assert!(config.validate().is_err());
    }
}
