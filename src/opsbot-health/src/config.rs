//! Health server configuration.

use serde::{Deserialize, Serialize};

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MESSAGE: &str = "opsbot is running!";

/// Health endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Whether `serve` starts the endpoint alongside the bot.
    pub enabled: bool,
    /// Address to bind, `host:port`.
    pub listen_addr: String,
    /// Free-form text returned in every response.
    pub message: String,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            message: DEFAULT_MESSAGE.to_string(),
        }
    }
}

impl HealthConfig {
    /// Keep the host and replace the port, as set by `PORT`.
    pub fn with_port(mut self, port: u16) -> Self {
        let host = self
            .listen_addr
            .rsplit_once(':')
            .map(|(host, _)| host)
            .unwrap_or("0.0.0.0");
        self.listen_addr = format!("{}:{}", host, port);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HealthConfig::default();
        assert!(config.enabled);
        assert_eq!(config.listen_addr, "0.0.0.0:3000");
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: HealthConfig =
            serde_json::from_str(r#"{"message": "up"}"#).unwrap();
        assert_eq!(config.message, "up");
        assert_eq!(config.listen_addr, DEFAULT_LISTEN_ADDR);
    }

    #[test]
    fn test_with_port() {
        let config = HealthConfig {
            listen_addr: "127.0.0.1:3000".to_string(),
            ..Default::default()
        }
        .with_port(8080);
        assert_eq!(config.listen_addr, "127.0.0.1:8080");

        let bare = HealthConfig {
            listen_addr: "localhost".to_string(),
            ..Default::default()
        }
        .with_port(9000);
        assert_eq!(bare.listen_addr, "0.0.0.0:9000");
    }
}
