//! Application configuration.
//!
//! Type-safe loading from environment variables with the `TAGTRAIL` prefix
//! and `__` as the nesting separator, e.g. `TAGTRAIL__SERVER__PORT=8080`.
//! A `.env` file is honored in development.

mod auth;
mod broker;
mod database;
mod error;
mod server;

pub use auth::AuthConfig;
pub use broker::BrokerConfig;
pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use server::ServerConfig;

use serde::Deserialize;

/// Root configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    pub database: DatabaseConfig,

    pub auth: AuthConfig,

    #[serde(default)]
    pub broker: BrokerConfig,
}

impl AppConfig {
    /// Load from the environment (and `.env` when present).
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("TAGTRAIL")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Semantic validation after deserialization.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.database.validate()?;
        self.auth.validate()?;
        self.broker.validate()?;
        Ok(())
    }
}
