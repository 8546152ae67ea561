//! Message formatting for Slack.
//!
//! Block Kit types and a small builder for composing responses.

use serde::{Deserialize, Serialize};

/// Slack Block Kit block types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlackBlock {
    /// Section block (main content).
    Section { text: SlackTextObject },
}

impl SlackBlock {
    /// Text of the block's primary text object.
    pub fn text(&self) -> &str {
        match self {
            Self::Section { text } => &text.text,
        }
    }
}

/// Slack text object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlackTextObject {
    #[serde(rename = "type")]
    pub text_type: String,
    pub text: String,
}

impl SlackTextObject {
    /// Create a mrkdwn text object.
    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Self {
            text_type: "mrkdwn".to_string(),
            text: text.into(),
        }
    }
}

/// Slack message content: plain text, blocks, or both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlackMessageContent {
    /// Message text, or fallback text for notifications when blocks are set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Block Kit blocks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocks: Option<Vec<SlackBlock>>,
}

impl SlackMessageContent {
    /// Create a new message content.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a plain text message.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new().with_text(text)
    }

    /// Set text.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set blocks.
    pub fn with_blocks(mut self, blocks: Vec<SlackBlock>) -> Self {
        self.blocks = Some(blocks);
        self
    }
}

/// Builder for creating rich Slack messages.
#[derive(Debug, Default)]
pub struct SlackMessageBuilder {
    blocks: Vec<SlackBlock>,
    fallback_text: Option<String>,
}

impl SlackMessageBuilder {
    /// Create a new message builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set fallback text for notifications.
    pub fn fallback(mut self, text: impl Into<String>) -> Self {
        self.fallback_text = Some(text.into());
        self
    }

    /// Add a section with mrkdwn text.
    pub fn section(mut self, text: impl Into<String>) -> Self {
        self.blocks.push(SlackBlock::Section {
            text: SlackTextObject::mrkdwn(text),
        });
        self
    }

    /// Build the message content.
    pub fn build(self) -> SlackMessageContent {
        SlackMessageContent {
            text: self.fallback_text,
            blocks: Some(self.blocks),
        }
    }
}
