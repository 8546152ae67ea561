//! Socket Mode wire types.
//!
//! Every frame Slack pushes over the WebSocket is an envelope; each one
//! carrying an `envelope_id` must be acknowledged by echoing that id back.

use serde::{Deserialize, Serialize};

/// Kind of payload carried by a Socket Mode envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeType {
    /// Sent once after the connection is established.
    Hello,
    /// Slack is about to recycle the connection.
    Disconnect,
    /// A slash command invocation.
    SlashCommands,
    /// Events API callback.
    EventsApi,
    /// Interactive component payload.
    Interactive,
    /// Anything newer than this client knows about.
    #[serde(other)]
    Unknown,
}

/// Socket Mode envelope wrapping a payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocketModeEnvelope {
    /// Envelope ID for acknowledgment (absent on `hello`/`disconnect`).
    #[serde(default)]
    pub envelope_id: Option<String>,
    /// Type of payload.
    #[serde(rename = "type")]
    pub envelope_type: EnvelopeType,
    /// Actual payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    /// Reason given with a `disconnect` envelope.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Accepts response payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accepts_response_payload: Option<bool>,
}

/// Socket Mode acknowledgment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocketModeAck {
    /// Envelope ID being acknowledged.
    pub envelope_id: String,
}

impl SocketModeAck {
    /// Create an acknowledgment.
    pub fn new(envelope_id: impl Into<String>) -> Self {
        Self {
            envelope_id: envelope_id.into(),
        }
    }

    /// Serialize to the JSON text frame sent back to Slack.
    pub fn to_frame(&self) -> String {
        serde_json::json!({ "envelope_id": self.envelope_id }).to_string()
    }
}
