//! The deployments API seam.

use async_trait::async_trait;

use crate::deployment::Deployment;
use crate::error::ClusterResult;

/// Namespaced Deployment operations.
///
/// Implementations must be safe to share across concurrently running
/// command handlers; every call is an independent request.
#[async_trait]
pub trait DeploymentApi: Send + Sync {
    /// List every deployment in `namespace`.
    async fn list_deployments(&self, namespace: &str) -> ClusterResult<Vec<Deployment>>;

    /// Fetch a single deployment.
    async fn get_deployment(&self, namespace: &str, name: &str) -> ClusterResult<Deployment>;

    /// Apply a strategic merge patch and return the updated object.
    async fn patch_deployment(
        &self,
        namespace: &str,
        name: &str,
        patch: &serde_json::Value,
    ) -> ClusterResult<Deployment>;
}
