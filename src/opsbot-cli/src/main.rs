//! opsbot - Slack slash commands for Kubernetes deployments.

mod config;
mod exec;
mod serve;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::OpsBotConfig;

/// opsbot
#[derive(Parser)]
#[command(name = "opsbot")]
#[command(about = "Check, restart, and scale deployments from Slack")]
#[command(version)]
struct Cli {
    /// Configuration file path (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (overrides the config file)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, global = true)]
    json_logs: bool,

    /// Target namespace (overrides config and OPSBOT_NAMESPACE)
    #[arg(short, long, global = true)]
    namespace: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Connect to Slack and serve commands (default)
    Serve,

    /// Run one command locally and print the response
    Exec {
        /// Command name, e.g. `scale-service` or `/scale-service`
        command: String,

        /// Command arguments
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },

    /// Run only the health endpoint
    Health,
}

fn setup_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // A missing .env is fine
    let dotenv = dotenvy::dotenv();

    let config = OpsBotConfig::resolve(cli.config.as_deref());

    let (level, json) = match &config {
        Ok(c) => (
            cli.log_level.clone().unwrap_or_else(|| c.logging.level.clone()),
            cli.json_logs || c.logging.json,
        ),
        Err(_) => (
            cli.log_level.clone().unwrap_or_else(|| "info".to_string()),
            cli.json_logs,
        ),
    };
    setup_logging(&level, json);

    if let Ok(path) = dotenv {
        info!("Loaded environment from {}", path.display());
    }

    let mut config = match config {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(namespace) = cli.namespace {
        config.namespace = namespace;
    }

    let result = match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve::run_bot(config).await,
        Command::Exec { command, args } => exec::run_exec(config, &command, &args).await,
        Command::Health => serve::run_health(config.health).await,
    };

    if let Err(e) = result {
        error!("{:#}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
