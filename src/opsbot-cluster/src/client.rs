//! Kubernetes REST client for `apps/v1` Deployments.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use secrecy::ExposeSecret;
use reqwest::Url;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::DeploymentApi;
use crate::config::{ClusterAuth, ClusterConfig};
use crate::deployment::{Deployment, DeploymentList, STRATEGIC_MERGE_PATCH};
use crate::error::{ClusterError, ClusterResult};

/// Client for one API server. Cheap to clone; clones share connections.
#[derive(Clone)]
pub struct KubeClient {
    http: reqwest::Client,
    server: Url,
    auth: ClusterAuth,
}

impl std::fmt::Debug for KubeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeClient")
            .field("server", &self.server.as_str())
            .finish()
    }
}

impl KubeClient {
    /// Build a client from resolved cluster config.
    pub fn new(config: ClusterConfig) -> ClusterResult<Self> {
        let server = Url::parse(&config.server).map_err(|e| {
            ClusterError::Config(format!("Invalid API server URL '{}': {}", config.server, e))
        })?;
        if server.cannot_be_a_base() {
            return Err(ClusterError::Config(format!(
                "Invalid API server URL '{}'",
                config.server
            )));
        }

        let mut builder = reqwest::Client::builder();

        if let Some(pem) = &config.root_cert_pem {
            let cert = reqwest::Certificate::from_pem(pem)
                .map_err(|e| ClusterError::Config(format!("Invalid CA certificate: {}", e)))?;
            builder = builder.add_root_certificate(cert);
        }
        if config.insecure_skip_tls_verify {
            builder = builder.danger_accept_invalid_certs(true);
        }
        if let ClusterAuth::ClientCertificate(pem) = &config.auth {
            let identity = reqwest::Identity::from_pem(pem)
                .map_err(|e| ClusterError::Config(format!("Invalid client certificate: {}", e)))?;
            builder = builder.identity(identity);
        }

        let http = builder
            .build()
            .map_err(|e| ClusterError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            server,
            auth: config.auth,
        })
    }

    /// The API server base URL.
    pub fn server(&self) -> &str {
        self.server.as_str()
    }

    /// `.../namespaces/{namespace}/deployments[/{name}]`.
    ///
    /// Names are validated and pushed as single path segments, so no input
    /// can address a different namespace or resource.
    fn deployments_url(&self, namespace: &str, name: Option<&str>) -> ClusterResult<Url> {
        check_object_name("namespace", namespace)?;
        if let Some(name) = name {
            check_object_name("deployment", name)?;
        }

        let mut url = self.server.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                ClusterError::Config(format!("Invalid API server URL '{}'", self.server))
            })?;
            segments
                .pop_if_empty()
                .extend(["apis", "apps", "v1", "namespaces", namespace, "deployments"]);
            if let Some(name) = name {
                segments.push(name);
            }
        }
        Ok(url)
    }

    async fn bearer_token(&self) -> ClusterResult<Option<String>> {
        match &self.auth {
            ClusterAuth::Token(token) => Ok(Some(token.expose_secret().to_string())),
            ClusterAuth::TokenFile(path) => {
                let token = tokio::fs::read_to_string(path).await.map_err(|e| {
                    ClusterError::Config(format!("Failed to read {}: {}", path.display(), e))
                })?;
                Ok(Some(token.trim().to_string()))
            }
            ClusterAuth::None | ClusterAuth::ClientCertificate(_) => Ok(None),
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> ClusterResult<T> {
        let request = match self.bearer_token().await? {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.header(ACCEPT, "application/json").send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClusterError::from_response(status.as_u16(), &body));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl DeploymentApi for KubeClient {
    async fn list_deployments(&self, namespace: &str) -> ClusterResult<Vec<Deployment>> {
        debug!("Listing deployments in {}", namespace);
        let url = self.deployments_url(namespace, None)?;
        let list: DeploymentList = self.send(self.http.get(url)).await?;
        Ok(list.items)
    }

    async fn get_deployment(&self, namespace: &str, name: &str) -> ClusterResult<Deployment> {
        debug!("Fetching deployment {}/{}", namespace, name);
        let url = self.deployments_url(namespace, Some(name))?;
        self.send(self.http.get(url)).await
    }

    async fn patch_deployment(
        &self,
        namespace: &str,
        name: &str,
        patch: &serde_json::Value,
    ) -> ClusterResult<Deployment> {
        debug!("Patching deployment {}/{}", namespace, name);
        let url = self.deployments_url(namespace, Some(name))?;
        let body = serde_json::to_vec(patch)?;
        let request = self
            .http
            .patch(url)
            .header(CONTENT_TYPE, STRATEGIC_MERGE_PATCH)
            .body(body);
        self.send(request).await
    }
}

/// Accept only RFC 1123 subdomains: dot-separated lowercase alphanumeric
/// labels, inner hyphens allowed, at most 253 bytes.
fn check_object_name(kind: &'static str, name: &str) -> ClusterResult<()> {
    let valid_label = |label: &str| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
    };

    if name.len() <= 253 && name.split('.').all(valid_label) {
        Ok(())
    } else {
        Err(ClusterError::InvalidName {
            kind,
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deployment::scale_patch;
    use secrecy::SecretString;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> KubeClient {
        let mut config = ClusterConfig::new(server.uri());
        config.auth = ClusterAuth::Token(SecretString::new("t0ken".to_string().into()));
        KubeClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_list_deployments() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/apis/apps/v1/namespaces/prod/deployments"))
            .and(header("Authorization", "Bearer t0ken"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "kind": "DeploymentList",
                "items": [
                    {"metadata": {"name": "api"}, "status": {"replicas": 2, "readyReplicas": 2}},
                    {"metadata": {"name": "worker"}, "status": {"replicas": 1}}
                ]
            })))
            .mount(&server)
            .await;

        let deployments = client_for(&server).list_deployments("prod").await.unwrap();

        assert_eq!(deployments.len(), 2);
        assert_eq!(deployments[0].metadata.name, "api");
        assert_eq!(deployments[1].ready_replicas(), 0);
    }

    #[tokio::test]
    async fn test_get_deployment_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/apis/apps/v1/namespaces/prod/deployments/ghost"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "kind": "Status",
                "status": "Failure",
                "message": "deployments.apps \"ghost\" not found",
                "reason": "NotFound",
                "code": 404
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_deployment("prod", "ghost")
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "deployments.apps \"ghost\" not found");
    }

    #[tokio::test]
    async fn test_patch_uses_strategic_merge() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/apis/apps/v1/namespaces/prod/deployments/api"))
            .and(header("Content-Type", STRATEGIC_MERGE_PATCH))
            .and(body_json(serde_json::json!({"spec": {"replicas": 4}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "metadata": {"name": "api"},
                "spec": {"replicas": 4}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let updated = client_for(&server)
            .patch_deployment("prod", "api", &scale_patch(4))
            .await
            .unwrap();

        assert_eq!(updated.spec.and_then(|s| s.replicas), Some(4));
    }

    #[tokio::test]
    async fn test_names_cannot_leave_the_namespace() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "metadata": {"name": "coredns"}
            })))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        for name in [
            "../../kube-system/deployments/coredns",
            "../statefulsets/db",
            "web?dryRun=All",
            "web#frag",
            "..",
            "Web",
            "",
        ] {
            let err = client
                .patch_deployment("prod", name, &scale_patch(0))
                .await
                .unwrap_err();
            assert!(
                matches!(err, ClusterError::InvalidName { kind: "deployment", .. }),
                "name {name:?} gave {err:?}"
            );
        }

        let err = client
            .list_deployments("../kube-system")
            .await
            .unwrap_err();
        assert!(matches!(err, ClusterError::InvalidName { kind: "namespace", .. }));

        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[test]
    fn test_deployments_url_keeps_server_prefix() {
        let client = KubeClient::new(ClusterConfig::new("https://10.0.0.1:6443/k8s/")).unwrap();

        let url = client.deployments_url("prod", Some("api-gateway.v2")).unwrap();
        assert_eq!(
            url.as_str(),
            "https://10.0.0.1:6443/k8s/apis/apps/v1/namespaces/prod/deployments/api-gateway.v2"
        );

        let list = client.deployments_url("prod", None).unwrap();
        assert_eq!(list.path(), "/k8s/apis/apps/v1/namespaces/prod/deployments");
    }

    #[test]
    fn test_invalid_server_url() {
        let err = KubeClient::new(ClusterConfig::new("not a url")).unwrap_err();
        assert!(matches!(err, ClusterError::Config(_)));
    }

    #[test]
    fn test_invalid_name_message() {
        let err = check_object_name("deployment", "Web").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid deployment name \"Web\": must be a lowercase RFC 1123 subdomain"
        );
        assert!(check_object_name("deployment", "api-gateway").is_ok());
        assert!(check_object_name("deployment", "-api").is_err());
        assert!(check_object_name("deployment", &"a".repeat(254)).is_err());
    }

    #[tokio::test]
    async fn test_token_file_read_per_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header("Authorization", "Bearer from-file"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"items": []})))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let token_path = dir.path().join("token");
        std::fs::write(&token_path, "from-file\n").unwrap();

        let mut config = ClusterConfig::new(server.uri());
        config.auth = ClusterAuth::TokenFile(token_path);
        let client = KubeClient::new(config).unwrap();

        assert!(client.list_deployments("prod").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_connection_failure_is_transport_error() {
        let client = KubeClient::new(ClusterConfig::new("http://127.0.0.1:1")).unwrap();
        let err = client.list_deployments("prod").await.unwrap_err();
        assert!(matches!(err, ClusterError::Transport(_)));
    }
}
