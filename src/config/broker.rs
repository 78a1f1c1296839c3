//! Device broker configuration.

use std::net::SocketAddr;

use serde::Deserialize;

use super::ConfigError;

#[derive(Debug, Clone, Deserialize)]
pub struct BrokerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Topic the bridge subscribes to for scan events.
    #[serde(default = "default_scan_topic")]
    pub scan_topic: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    1883
}

fn default_scan_topic() -> String {
    // Serial-prefixed topic the deployed FXR90 readers publish on.
    "FXR90CBBF41/data/read".to_string()
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            scan_topic: default_scan_topic(),
        }
    }
}

impl BrokerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::invalid(format!("bad broker address {}:{}", self.host, self.port)))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scan_topic.trim().is_empty() {
            return Err(ConfigError::invalid("broker.scan_topic must not be blank"));
        }
        self.socket_addr().map(|_| ())
    }
}
