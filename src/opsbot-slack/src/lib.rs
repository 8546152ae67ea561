//! Slack client for opsbot.
//!
//! This crate provides the chat side of the bot:
//! - Socket Mode connection with automatic reconnects
//! - Slash command payloads and per-invocation ack/respond capabilities
//! - Block Kit message types
//!
//! # Architecture
//!
//! [`OpsSlackBot`] owns the WebSocket link. Each slash command becomes a
//! [`CommandInvocation`] handed to a [`SlashCommandHandler`] on its own task;
//! the handler acknowledges over the socket and answers through the
//! command's `response_url`.
//!
//! # Configuration
//!
//! Required environment variables:
//! - `SLACK_BOT_TOKEN` - Bot OAuth token (xoxb-...)
//! - `SLACK_APP_TOKEN` - App-level token for Socket Mode (xapp-...)

pub mod bot;
pub mod commands;
pub mod config;
pub mod error;
pub mod messages;
pub mod socket_mode;

// Re-export main types
pub use bot::{BotOptions, OpsSlackBot};
pub use commands::{
    CommandInvocation, CommandResponder, SlashCommandHandler, SlashCommandPayload,
};
pub use config::SlackConfig;
pub use error::{SlackError, SlackResult};
pub use messages::{SlackBlock, SlackMessageBuilder, SlackMessageContent};
