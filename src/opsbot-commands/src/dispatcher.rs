//! Routing slash commands to the cluster.

use std::sync::Arc;

use async_trait::async_trait;
use opsbot_cluster::DeploymentApi;
use opsbot_slack::{CommandInvocation, SlackMessageContent, SlashCommandHandler};
use tracing::{error, info, warn};

use crate::error::CommandError;
use crate::handlers;
use crate::request::OpsCommand;

/// Namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "prod";

/// Stateless dispatcher shared by every invocation.
#[derive(Clone)]
pub struct CommandDispatcher {
    api: Arc<dyn DeploymentApi>,
    namespace: String,
}

impl std::fmt::Debug for CommandDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDispatcher")
            .field("namespace", &self.namespace)
            .finish()
    }
}

impl CommandDispatcher {
    pub fn new(api: Arc<dyn DeploymentApi>, namespace: impl Into<String>) -> Self {
        Self {
            api,
            namespace: namespace.into(),
        }
    }

    /// Namespace every operation is scoped to.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Validate and run a command, returning whatever should be shown.
    ///
    /// Always produces a message; failures become their error text.
    pub async fn execute(&self, command: &str, text: &str) -> SlackMessageContent {
        match self.run(command, text).await {
            Ok(message) => message,
            Err(e) => {
                if e.is_validation() {
                    info!("Rejected {} {:?}: {}", command, text, e);
                } else {
                    warn!("{} failed: {}", command, e);
                }
                SlackMessageContent::text(e.to_string())
            }
        }
    }

    async fn run(&self, command: &str, text: &str) -> Result<SlackMessageContent, CommandError> {
        let parsed = OpsCommand::parse(command, text)?;
        info!("Running {} in namespace {}", parsed.name(), self.namespace);

        let api = self.api.as_ref();
        match parsed {
            OpsCommand::ServiceStatus => handlers::service_status(api, &self.namespace).await,
            OpsCommand::RestartService { service } => {
                handlers::restart_service(api, &self.namespace, &service).await
            }
            OpsCommand::ScaleService(request) => {
                handlers::scale_service(api, &self.namespace, &request).await
            }
        }
    }
}

#[async_trait]
impl SlashCommandHandler for CommandDispatcher {
    async fn handle(&self, invocation: CommandInvocation) {
        if let Err(e) = invocation.ack().await {
            warn!("Failed to acknowledge {}: {}", invocation.command(), e);
        }

        info!(
            "Handling {} from user {} in channel {}",
            invocation.command(),
            invocation.user_id(),
            invocation.channel_id()
        );

        let message = self.execute(invocation.command(), invocation.text()).await;

        if let Err(e) = invocation.respond(message).await {
            error!("Failed to respond to {}: {}", invocation.command(), e);
        }
    }
}
