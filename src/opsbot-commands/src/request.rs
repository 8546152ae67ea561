//! Turning slash command text into validated requests.

use chrono::{DateTime, Utc};

use crate::error::{CommandError, INVALID_REPLICAS, MISSING_RESTART_TARGET, MISSING_SCALE_ARGS};

pub const SERVICE_STATUS: &str = "/service-status";
pub const RESTART_SERVICE: &str = "/restart-service";
pub const SCALE_SERVICE: &str = "/scale-service";

/// A validated command, ready to run against the cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpsCommand {
    /// List every deployment with its readiness.
    ServiceStatus,
    /// Trigger a rolling restart of one deployment.
    RestartService {
        /// Deployment name.
        service: String,
    },
    /// Set a deployment's desired replica count.
    ScaleService(ScaleRequest),
}

impl OpsCommand {
    /// Parse and validate a command. Never touches the cluster.
    pub fn parse(command: &str, text: &str) -> Result<Self, CommandError> {
        match command {
            SERVICE_STATUS => Ok(Self::ServiceStatus),
            RESTART_SERVICE => {
                let service = text.trim();
                if service.is_empty() {
                    return Err(CommandError::Validation(MISSING_RESTART_TARGET));
                }
                Ok(Self::RestartService {
                    service: service.to_string(),
                })
            }
            SCALE_SERVICE => ScaleRequest::parse(text).map(Self::ScaleService),
            other => Err(CommandError::UnknownCommand(other.to_string())),
        }
    }

    /// Name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ServiceStatus => "service-status",
            Self::RestartService { .. } => "restart-service",
            Self::ScaleService(_) => "scale-service",
        }
    }
}

/// Target replica count for a deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleRequest {
    pub service: String,
    pub replicas: u32,
}

impl ScaleRequest {
    /// Parse `<service> <replicas>`; tokens past the second are ignored.
    pub fn parse(text: &str) -> Result<Self, CommandError> {
        let mut tokens = text.split_whitespace();
        let (Some(service), Some(replicas)) = (tokens.next(), tokens.next()) else {
            return Err(CommandError::Validation(MISSING_SCALE_ARGS));
        };

        let replicas = replicas
            .parse::<u32>()
            .map_err(|_| CommandError::Validation(INVALID_REPLICAS))?;

        Ok(Self {
            service: service.to_string(),
            replicas,
        })
    }

    /// The strategic merge patch for this request.
    pub fn patch(&self) -> serde_json::Value {
        opsbot_cluster::scale_patch(self.replicas)
    }
}

/// One-shot restart of a deployment, stamped at creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartDirective {
    pub service: String,
    pub restarted_at: DateTime<Utc>,
}

impl RestartDirective {
    /// A directive stamped with the current time.
    pub fn now(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            restarted_at: Utc::now(),
        }
    }

    /// The strategic merge patch for this restart.
    pub fn patch(&self) -> serde_json::Value {
        opsbot_cluster::restart_patch(self.restarted_at)
    }
}
