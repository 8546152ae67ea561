//! Rendering command results as Slack messages.

use opsbot_cluster::Deployment;
use opsbot_slack::{SlackMessageBuilder, SlackMessageContent};

const STATUS_HEADING: &str = "Service Status";
const UNKNOWN_STATUS: &str = "Unknown";

/// What the status listing shows for one deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentDescriptor {
    pub name: String,
    pub ready_replicas: i32,
    pub desired_replicas: i32,
    pub status: String,
}

impl DeploymentDescriptor {
    /// `"<ready>/<desired>"`.
    pub fn replicas(&self) -> String {
        format!("{}/{}", self.ready_replicas, self.desired_replicas)
    }
}

impl From<&Deployment> for DeploymentDescriptor {
    fn from(deployment: &Deployment) -> Self {
        Self {
            name: deployment.metadata.name.clone(),
            ready_replicas: deployment.ready_replicas(),
            desired_replicas: deployment.status_replicas(),
            status: deployment
                .first_condition_status()
                .unwrap_or(UNKNOWN_STATUS)
                .to_string(),
        }
    }
}

/// Heading block plus one section per deployment.
pub fn status_message(deployments: &[DeploymentDescriptor]) -> SlackMessageContent {
    deployments
        .iter()
        .fold(
            SlackMessageBuilder::new()
                .fallback(STATUS_HEADING)
                .section(format!("*{}*", STATUS_HEADING)),
            |builder, dep| {
                builder.section(format!(
                    "*{}*\nReplicas: {}\nStatus: {}",
                    dep.name,
                    dep.replicas(),
                    dep.status
                ))
            },
        )
        .build()
}

pub fn restart_message(service: &str) -> SlackMessageContent {
    SlackMessageContent::text(format!("Service {} restart initiated", service))
}

pub fn scale_message(service: &str, replicas: u32) -> SlackMessageContent {
    SlackMessageContent::text(format!("Service {} scaled to {} replicas", service, replicas))
}
