//! Error types for cluster operations.
//!
//! The `Display` form of every variant is the bare failure message, so
//! callers can embed it verbatim in user-facing text.

use serde::Deserialize;
use thiserror::Error;

/// Errors returned by the deployments API.
#[derive(Error, Debug)]
pub enum ClusterError {
    /// The API server rejected the request (not found, forbidden, conflict...).
    #[error("{message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Machine-readable reason from the `Status` object, e.g. `NotFound`.
        reason: Option<String>,
        /// Human-readable message from the API server.
        message: String,
    },

    /// The request never produced a response (connect failure, timeout, TLS).
    #[error("{0}")]
    Transport(String),

    /// The response body could not be decoded.
    #[error("{0}")]
    Decode(String),

    /// Credentials or cluster location could not be loaded.
    #[error("{0}")]
    Config(String),

    /// The object name is not one the API server accepts; nothing was sent.
    #[error("invalid {kind} name \"{name}\": must be a lowercase RFC 1123 subdomain")]
    InvalidName { kind: &'static str, name: String },
}

impl ClusterError {
    /// Build an API error from a non-success response body.
    ///
    /// Kubernetes answers failures with a `Status` object; anything else is
    /// reported with the status line and raw body.
    pub fn from_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ApiStatus>(body) {
            Ok(s) if !s.message.is_empty() => Self::Api {
                status,
                reason: s.reason,
                message: s.message,
            },
            _ => Self::Api {
                status,
                reason: None,
                message: if body.trim().is_empty() {
                    format!("HTTP {}", status)
                } else {
                    format!("HTTP {}: {}", status, body.trim())
                },
            },
        }
    }

    /// Whether the API server reported the object as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }
}

/// The `Status` object returned with API failures.
#[derive(Debug, Deserialize)]
struct ApiStatus {
    #[serde(default)]
    message: String,
    #[serde(default)]
    reason: Option<String>,
}

impl From<reqwest::Error> for ClusterError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClusterError::Decode(err.to_string())
        } else {
            ClusterError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClusterError {
    fn from(err: serde_json::Error) -> Self {
        ClusterError::Decode(err.to_string())
    }
}

impl From<serde_yaml::Error> for ClusterError {
    fn from(err: serde_yaml::Error) -> Self {
        ClusterError::Config(format!("Invalid kubeconfig: {}", err))
    }
}

/// Result type for cluster operations.
pub type ClusterResult<T> = std::result::Result<T, ClusterError>;
