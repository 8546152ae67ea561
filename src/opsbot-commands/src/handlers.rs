//! The three cluster operations behind the slash commands.

use opsbot_cluster::DeploymentApi;
use opsbot_slack::SlackMessageContent;
use tracing::info;

use crate::error::CommandError;
use crate::format::{DeploymentDescriptor, restart_message, scale_message, status_message};
use crate::request::{RestartDirective, ScaleRequest};

/// List deployments in `namespace` and render their readiness.
pub async fn service_status(
    api: &dyn DeploymentApi,
    namespace: &str,
) -> Result<SlackMessageContent, CommandError> {
    let deployments = api
        .list_deployments(namespace)
        .await
        .map_err(CommandError::api("Error getting service status"))?;

    let descriptors: Vec<DeploymentDescriptor> =
        deployments.iter().map(DeploymentDescriptor::from).collect();

    info!(
        "Reporting status of {} deployments in {}",
        descriptors.len(),
        namespace
    );
    Ok(status_message(&descriptors))
}

/// Bump the restart annotation so the controller rolls every pod.
pub async fn restart_service(
    api: &dyn DeploymentApi,
    namespace: &str,
    service: &str,
) -> Result<SlackMessageContent, CommandError> {
    const CONTEXT: &str = "Error restarting service";

    // Fail with the API's own message when the deployment is missing
    api.get_deployment(namespace, service)
        .await
        .map_err(CommandError::api(CONTEXT))?;

    let directive = RestartDirective::now(service);
    api.patch_deployment(namespace, service, &directive.patch())
        .await
        .map_err(CommandError::api(CONTEXT))?;

    info!(
        "Restart of {}/{} requested at {}",
        namespace, service, directive.restarted_at
    );
    Ok(restart_message(service))
}

/// Set the desired replica count.
pub async fn scale_service(
    api: &dyn DeploymentApi,
    namespace: &str,
    request: &ScaleRequest,
) -> Result<SlackMessageContent, CommandError> {
    api.patch_deployment(namespace, &request.service, &request.patch())
        .await
        .map_err(CommandError::api("Error scaling service"))?;

    info!(
        "Scaled {}/{} to {} replicas",
        namespace, request.service, request.replicas
    );
    Ok(scale_message(&request.service, request.replicas))
}
