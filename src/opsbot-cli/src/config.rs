//! opsbot configuration.
//!
//! Read from an optional TOML file, then overridden from the environment.
//! Slack tokens are never part of the file; they come from
//! `SLACK_BOT_TOKEN` and `SLACK_APP_TOKEN` only.

use std::path::Path;

use anyhow::Context;
use opsbot_cluster::ClusterSettings;
use opsbot_commands::DEFAULT_NAMESPACE;
use opsbot_health::HealthConfig;
use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpsBotConfig {
    /// Namespace every command operates on.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Health endpoint.
    #[serde(default)]
    pub health: HealthConfig,

    /// Where the cluster is and how to authenticate.
    #[serde(default)]
    pub cluster: ClusterSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON output.
    #[serde(default)]
    pub json: bool,
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for OpsBotConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            health: HealthConfig::default(),
            cluster: ClusterSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl OpsBotConfig {
    /// Load from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// File (when given) plus process environment.
    pub fn resolve(path: Option<&Path>) -> anyhow::Result<Self> {
        let config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.with_env(|key| std::env::var(key).ok())
    }

    /// Apply environment overrides read through `lookup`.
    ///
    /// - `OPSBOT_NAMESPACE` - target namespace
    /// - `PORT` - health endpoint port
    pub fn with_env<F>(mut self, lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(namespace) = lookup("OPSBOT_NAMESPACE").filter(|n| !n.trim().is_empty()) {
            self.namespace = namespace.trim().to_string();
        }

        if let Some(port) = lookup("PORT") {
            let port: u16 = port
                .trim()
                .parse()
                .with_context(|| format!("Invalid PORT '{}'", port))?;
            self.health = self.health.with_port(port);
        }

        Ok(self)
    }
}
