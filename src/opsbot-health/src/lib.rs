//! Liveness endpoint for opsbot.
//!
//! A single `GET /` route answering with a fixed status payload, for
//! container probes and load balancers. It reports process liveness only;
//! neither Slack nor the cluster is consulted.

pub mod config;

use std::future::Future;
use std::net::SocketAddr;

use axum::{Json, Router, extract::State, routing::get};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use config::HealthConfig;

/// Health server failures.
#[derive(Debug, Error)]
pub enum HealthError {
    #[error("Invalid listen address '{addr}': {source}")]
    InvalidAddr {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("Health server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Health check response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    /// ISO-8601, UTC, millisecond precision.
    pub timestamp: String,
}

#[derive(Clone)]
struct HealthState {
    message: String,
}

/// Health check endpoint.
async fn health_check(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: state.message,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// Create the health router.
pub fn create_router(message: impl Into<String>) -> Router {
    Router::new()
        .route("/", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(HealthState {
            message: message.into(),
        })
}

/// Serve the endpoint until `shutdown` resolves.
pub async fn run_with_shutdown<F>(config: HealthConfig, shutdown: F) -> Result<(), HealthError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr: SocketAddr =
        config
            .listen_addr
            .parse()
            .map_err(|source| HealthError::InvalidAddr {
                addr: config.listen_addr.clone(),
                source,
            })?;

    let listener = TcpListener::bind(addr).await?;
    info!("Health endpoint listening on {}", listener.local_addr()?);

    axum::serve(listener, create_router(config.message))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Health endpoint stopped");
    Ok(())
}
