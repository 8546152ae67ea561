//! Long-running modes: the bot with its health endpoint, or the endpoint alone.

use std::sync::Arc;

use anyhow::Context;
use opsbot_cluster::{ClusterConfig, DeploymentApi, KubeClient};
use opsbot_commands::CommandDispatcher;
use opsbot_health::HealthConfig;
use opsbot_slack::{OpsSlackBot, SlackConfig};
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::config::OpsBotConfig;

/// Build the deployments client from the configured cluster settings.
pub fn connect_cluster(config: &OpsBotConfig) -> anyhow::Result<Arc<dyn DeploymentApi>> {
    let cluster = ClusterConfig::from_settings(&config.cluster)
        .context("Failed to load cluster credentials")?;
    let client = KubeClient::new(cluster).context("Failed to create cluster client")?;
    info!("Using API server {}", client.server());
    Ok(Arc::new(client))
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}

/// Run the Slack bot, and the health endpoint when enabled, until a signal.
pub async fn run_bot(config: OpsBotConfig) -> anyhow::Result<()> {
    let slack = SlackConfig::from_env().context("Slack is not configured")?;
    let api = connect_cluster(&config)?;
    let dispatcher = Arc::new(CommandDispatcher::new(api, config.namespace.clone()));
    let bot = Arc::new(OpsSlackBot::new(slack, dispatcher)?);

    info!("Serving commands for namespace {}", config.namespace);

    let (stop_tx, stop_rx) = watch::channel(false);
    let health_task = config.health.enabled.then(|| {
        let health = config.health.clone();
        let mut stop_rx = stop_rx.clone();
        tokio::spawn(async move {
            let stopped = async move {
                let _ = stop_rx.changed().await;
            };
            if let Err(e) = opsbot_health::run_with_shutdown(health, stopped).await {
                error!("Health endpoint failed: {}", e);
            }
        })
    });

    let mut bot_task = {
        let bot = Arc::clone(&bot);
        tokio::spawn(async move { bot.start().await })
    };

    let joined = tokio::select! {
        _ = shutdown_signal() => {
            bot.shutdown();
            (&mut bot_task).await
        }
        joined = &mut bot_task => {
            warn!("Slack connection ended without a shutdown signal");
            joined
        }
    };

    let _ = stop_tx.send(true);
    if let Some(task) = health_task {
        let _ = task.await;
    }

    joined.context("Slack bot task panicked")??;
    info!("opsbot stopped");
    Ok(())
}

/// Run only the health endpoint.
pub async fn run_health(health: HealthConfig) -> anyhow::Result<()> {
    opsbot_health::run_with_shutdown(health, shutdown_signal()).await?;
    Ok(())
}
