//! Slack client failures.

use thiserror::Error;

/// Everything that can go wrong talking to Slack.
#[derive(Error, Debug)]
pub enum SlackError {
    /// Tokens missing or malformed.
    #[error("Slack configuration error: {0}")]
    Config(String),

    /// Slack refused the token. Not retried.
    #[error("Slack authentication failed: {0}")]
    Auth(String),

    /// A Web API call or `response_url` post came back with a failure.
    #[error("Slack API error: {0}")]
    Api(String),

    #[error("Rate limited by Slack; retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("HTTP request to Slack failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The Socket Mode link broke or closed under us.
    #[error("Socket Mode connection error: {0}")]
    Socket(String),

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A command invocation was acknowledged or answered more than once.
    #[error("Invocation already {0}")]
    AlreadyHandled(&'static str),
}

impl From<tokio_tungstenite::tungstenite::Error> for SlackError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        SlackError::Socket(err.to_string())
    }
}

pub type SlackResult<T> = std::result::Result<T, SlackError>;

/// Error codes meaning the token itself is unusable.
const AUTH_ERROR_CODES: &[&str] = &["invalid_auth", "not_authed", "account_inactive", "token_revoked"];

/// Retry hint used when Slack reports `ratelimited` in the body.
const DEFAULT_RETRY_AFTER_SECS: u64 = 30;

/// An `ok: false` Web API reply.
#[derive(Debug, Clone)]
pub struct SlackApiError {
    /// Slack's error code, e.g. `invalid_auth`.
    pub code: String,
    pub message: String,
}

impl SlackApiError {
    /// `None` when the body reports `ok: true`.
    pub fn from_response(method: &str, body: &serde_json::Value) -> Option<Self> {
        if body.get("ok").and_then(|v| v.as_bool()) == Some(true) {
            return None;
        }
        let code = body
            .get("error")
            .and_then(|e| e.as_str())
            .unwrap_or("unknown")
            .to_string();
        let message = format!("{} failed: {}", method, code);
        Some(Self { code, message })
    }
}

impl From<SlackApiError> for SlackError {
    fn from(err: SlackApiError) -> Self {
        if err.code == "ratelimited" {
            SlackError::RateLimited {
                retry_after_secs: DEFAULT_RETRY_AFTER_SECS,
            }
        } else if AUTH_ERROR_CODES.contains(&err.code.as_str()) {
            SlackError::Auth(err.message)
        } else {
            SlackError::Api(err.message)
        }
    }
}
