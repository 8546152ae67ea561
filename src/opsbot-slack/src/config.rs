//! Slack credentials.
//!
//! Tokens are read from the environment only and kept as [`SecretString`],
//! so they stay out of debug output and logs.

use secrecy::{ExposeSecret, SecretString};

use crate::error::{SlackError, SlackResult};

pub const DEFAULT_API_BASE_URL: &str = "https://slack.com/api";

const BOT_TOKEN_VAR: &str = "SLACK_BOT_TOKEN";
const APP_TOKEN_VAR: &str = "SLACK_APP_TOKEN";
const API_BASE_URL_VAR: &str = "SLACK_API_BASE_URL";

const BOT_TOKEN_PREFIX: &str = "xoxb-";
const APP_TOKEN_PREFIX: &str = "xapp-";

/// Bot token for Web API calls plus app token for Socket Mode.
#[derive(Clone)]
pub struct SlackConfig {
    bot_token: SecretString,
    app_token: SecretString,
    api_base_url: String,
}

impl std::fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackConfig")
            .field("bot_token", &"[REDACTED]")
            .field("app_token", &"[REDACTED]")
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

impl SlackConfig {
    pub fn new(bot_token: impl Into<String>, app_token: impl Into<String>) -> Self {
        Self {
            bot_token: SecretString::from(bot_token.into()),
            app_token: SecretString::from(app_token.into()),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }

    /// Send Web API calls somewhere other than slack.com, e.g. a test server.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Read `SLACK_BOT_TOKEN`, `SLACK_APP_TOKEN` and, when set,
    /// `SLACK_API_BASE_URL`. The result is validated.
    pub fn from_env() -> SlackResult<Self> {
        let read = |var: &str| {
            std::env::var(var).map_err(|_| SlackError::Config(format!("{} not set", var)))
        };

        let mut config = Self::new(read(BOT_TOKEN_VAR)?, read(APP_TOKEN_VAR)?);
        if let Ok(base_url) = std::env::var(API_BASE_URL_VAR) {
            config = config.with_api_base_url(base_url);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn bot_token(&self) -> &str {
        self.bot_token.expose_secret()
    }

    pub fn app_token(&self) -> &str {
        self.app_token.expose_secret()
    }

    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    /// Both tokens present and of the right kind.
    pub fn validate(&self) -> SlackResult<()> {
        check_token(BOT_TOKEN_VAR, self.bot_token(), BOT_TOKEN_PREFIX)?;
        check_token(APP_TOKEN_VAR, self.app_token(), APP_TOKEN_PREFIX)
    }
}

fn check_token(var: &str, token: &str, prefix: &str) -> SlackResult<()> {
    if token.trim().is_empty() {
        return Err(SlackError::Config(format!("{} is empty", var)));
    }
    if !token.starts_with(prefix) {
        return Err(SlackError::Config(format!(
            "{} must start with '{}'",
            var, prefix
        )));
    }
    Ok(())
}
