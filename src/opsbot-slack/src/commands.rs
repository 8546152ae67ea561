//! Slack slash command handling.
//!
//! A slash command arrives as a [`SlashCommandPayload`] and is handed to a
//! [`SlashCommandHandler`] wrapped in a [`CommandInvocation`], which carries
//! the two capabilities a handler needs: acknowledging receipt and sending
//! the single response.
//!
//! Responses are delivered through the command's `response_url`, which
//! stays valid for 30 minutes after the invocation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::{SlackError, SlackResult};
use crate::messages::SlackMessageContent;

/// Slack slash command payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlashCommandPayload {
    /// Team ID.
    #[serde(default)]
    pub team_id: String,
    /// Team domain.
    #[serde(default)]
    pub team_domain: String,
    /// Channel ID where command was invoked.
    #[serde(default)]
    pub channel_id: String,
    /// Channel name.
    #[serde(default)]
    pub channel_name: String,
    /// User ID who invoked the command.
    #[serde(default)]
    pub user_id: String,
    /// Username.
    #[serde(default)]
    pub user_name: String,
    /// The command (e.g., "/service-status").
    pub command: String,
    /// Text after the command.
    #[serde(default)]
    pub text: String,
    /// API app ID.
    #[serde(default)]
    pub api_app_id: String,
    /// URL for delayed responses.
    #[serde(default)]
    pub response_url: String,
    /// Trigger ID for opening modals.
    #[serde(default)]
    pub trigger_id: String,
}

impl SlashCommandPayload {
    /// Build a payload for a command that did not come from Slack.
    pub fn local(command: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            text: text.into(),
            user_id: "local".to_string(),
            channel_id: "local".to_string(),
            ..Default::default()
        }
    }
}

/// The acknowledge and respond capabilities behind an invocation.
#[async_trait]
pub trait CommandResponder: Send + Sync {
    /// Tell Slack the command was received.
    async fn ack(&self) -> SlackResult<()>;

    /// Deliver the command's response.
    async fn respond(&self, message: SlackMessageContent) -> SlackResult<()>;
}

/// A single slash command invocation.
///
/// Enforces at most one acknowledgment and at most one response,
/// whatever the underlying responder does.
pub struct CommandInvocation {
    payload: SlashCommandPayload,
    responder: Arc<dyn CommandResponder>,
    acked: AtomicBool,
    responded: AtomicBool,
}

impl std::fmt::Debug for CommandInvocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandInvocation")
            .field("command", &self.payload.command)
            .field("text", &self.payload.text)
            .field("user_id", &self.payload.user_id)
            .field("acked", &self.acked.load(Ordering::SeqCst))
            .field("responded", &self.responded.load(Ordering::SeqCst))
            .finish()
    }
}

impl CommandInvocation {
    /// Wrap a payload together with the responder that answers it.
    pub fn new(payload: SlashCommandPayload, responder: Arc<dyn CommandResponder>) -> Self {
        Self {
            payload,
            responder,
            acked: AtomicBool::new(false),
            responded: AtomicBool::new(false),
        }
    }

    /// The command name, e.g. `/scale-service`.
    pub fn command(&self) -> &str {
        &self.payload.command
    }

    /// Raw argument text after the command name.
    pub fn text(&self) -> &str {
        &self.payload.text
    }

    /// User who invoked the command.
    pub fn user_id(&self) -> &str {
        &self.payload.user_id
    }

    /// Channel the command was invoked in.
    pub fn channel_id(&self) -> &str {
        &self.payload.channel_id
    }

    /// Acknowledge receipt.
    pub async fn ack(&self) -> SlackResult<()> {
        if self.acked.swap(true, Ordering::SeqCst) {
            return Err(SlackError::AlreadyHandled("acknowledged"));
        }
        self.responder.ack().await
    }

    /// Send the response. Only the first call reaches Slack.
    pub async fn respond(&self, message: SlackMessageContent) -> SlackResult<()> {
        if self.responded.swap(true, Ordering::SeqCst) {
            return Err(SlackError::AlreadyHandled("responded to"));
        }
        self.responder.respond(message).await
    }

    /// Whether a response has been sent.
    pub fn has_responded(&self) -> bool {
        self.responded.load(Ordering::SeqCst)
    }
}

/// Handles slash command invocations.
///
/// Implementations own their failure path entirely: nothing is returned,
/// and every invocation is expected to end in exactly one response.
#[async_trait]
pub trait SlashCommandHandler: Send + Sync {
    /// Handle one invocation.
    async fn handle(&self, invocation: CommandInvocation);
}

/// Send a delayed response to a command's `response_url`.
pub async fn send_delayed_response(
    client: &reqwest::Client,
    response_url: &str,
    message: &SlackMessageContent,
) -> SlackResult<()> {
    debug!("Sending delayed response to: {}", response_url);

    let resp = client.post(response_url).json(message).send().await?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        error!("Failed to send delayed response: {} - {}", status, body);
        return Err(SlackError::Api(format!(
            "Failed to send delayed response: {} - {}",
            status, body
        )));
    }

    debug!("Delayed response sent successfully");
    Ok(())
}
