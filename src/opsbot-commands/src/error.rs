//! Command failures and their user-facing text.

use opsbot_cluster::ClusterError;
use thiserror::Error;

pub const MISSING_RESTART_TARGET: &str = "Please provide a service name to restart";
pub const MISSING_SCALE_ARGS: &str = "Please provide both service name and number of replicas";
pub const INVALID_REPLICAS: &str = "Please provide a valid number for replicas";

/// Why a command did not succeed.
///
/// `Display` is exactly the text sent back to the user.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Arguments were missing or malformed; no API call was made.
    #[error("{0}")]
    Validation(&'static str),

    /// The orchestration API call failed.
    #[error("{context}: {source}")]
    Api {
        /// Lead-in naming the failed operation.
        context: &'static str,
        #[source]
        source: ClusterError,
    },

    /// No handler is registered for the command name.
    #[error("Unknown command: {0}")]
    UnknownCommand(String),
}

impl CommandError {
    /// Wrap a cluster failure with the operation it interrupted.
    pub fn api(context: &'static str) -> impl FnOnce(ClusterError) -> Self {
        move |source| Self::Api { context, source }
    }

    /// Whether the command was rejected before reaching the cluster.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::UnknownCommand(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_text_is_guidance_only() {
        let err = CommandError::Validation(INVALID_REPLICAS);
        assert_eq!(err.to_string(), "Please provide a valid number for replicas");
        assert!(err.is_validation());
    }

    #[test]
    fn test_api_text_embeds_message() {
        let err = CommandError::api("Error scaling service")(ClusterError::Transport(
            "connection refused".to_string(),
        ));
        assert_eq!(err.to_string(), "Error scaling service: connection refused");
        assert!(!err.is_validation());
    }

    #[test]
    fn test_unknown_command_text() {
        let err = CommandError::UnknownCommand("/deploy".to_string());
        assert_eq!(err.to_string(), "Unknown command: /deploy");
    }
}
