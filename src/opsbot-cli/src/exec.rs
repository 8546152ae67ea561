//! One-shot command execution from the terminal.

use std::sync::Arc;

use async_trait::async_trait;
use opsbot_commands::CommandDispatcher;
use opsbot_slack::{
    CommandInvocation, CommandResponder, SlackMessageContent, SlackResult, SlashCommandHandler,
    SlashCommandPayload,
};
use tracing::debug;

use crate::config::OpsBotConfig;
use crate::serve::connect_cluster;

/// Prints the response where Slack would have shown it.
struct StdoutResponder;

#[async_trait]
impl CommandResponder for StdoutResponder {
    async fn ack(&self) -> SlackResult<()> {
        debug!("Command acknowledged");
        Ok(())
    }

    async fn respond(&self, message: SlackMessageContent) -> SlackResult<()> {
        println!("{}", render(&message)?);
        Ok(())
    }
}

/// Response as the JSON body Slack would receive.
fn render(message: &SlackMessageContent) -> SlackResult<String> {
    Ok(serde_json::to_string_pretty(message)?)
}

/// Accept `scale-service` as well as `/scale-service`.
fn normalize_command(command: &str) -> String {
    if command.starts_with('/') {
        command.to_string()
    } else {
        format!("/{}", command)
    }
}

/// Run a single command against the cluster and print its response.
pub async fn run_exec(config: OpsBotConfig, command: &str, args: &[String]) -> anyhow::Result<()> {
    let api = connect_cluster(&config)?;
    let dispatcher = CommandDispatcher::new(api, config.namespace);

    let payload = SlashCommandPayload::local(normalize_command(command), args.join(" "));
    let invocation = CommandInvocation::new(payload, Arc::new(StdoutResponder));

    dispatcher.handle(invocation).await;
    Ok(())
}
