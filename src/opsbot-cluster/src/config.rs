//! Locating the API server and loading credentials.
//!
//! Resolution order when nothing is set explicitly:
//! 1. the first file listed in `KUBECONFIG`
//! 2. `~/.kube/config`
//! 3. the in-cluster service account

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ClusterError, ClusterResult};

/// Service account mount inside a pod.
pub const SERVICE_ACCOUNT_DIR: &str = "/var/run/secrets/kubernetes.io/serviceaccount";

/// Cluster settings as written in the opsbot config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterSettings {
    /// Kubeconfig file to read instead of the default search.
    pub kubeconfig: Option<PathBuf>,
    /// Kubeconfig context to use instead of `current-context`.
    pub context: Option<String>,
    /// API server URL; bypasses kubeconfig entirely when set.
    pub server: Option<String>,
    /// Bearer token file used with `server`.
    pub token_file: Option<PathBuf>,
    /// PEM CA bundle used with `server`.
    pub ca_file: Option<PathBuf>,
    /// Skip server certificate verification.
    pub insecure_skip_tls_verify: bool,
}

/// How requests authenticate to the API server.
#[derive(Debug, Clone)]
pub enum ClusterAuth {
    /// No credentials (e.g. behind `kubectl proxy`).
    None,
    /// Static bearer token.
    Token(SecretString),
    /// Bearer token re-read from disk on every request, for rotated tokens.
    TokenFile(PathBuf),
    /// Client certificate and key, concatenated PEM.
    ClientCertificate(Vec<u8>),
}

/// Everything needed to build a client.
#[derive(Debug, Clone)]
pub struct ClusterConfig {
    /// API server base URL.
    pub server: String,
    /// Request credentials.
    pub auth: ClusterAuth,
    /// Extra PEM root certificate for the API server.
    pub root_cert_pem: Option<Vec<u8>>,
    /// Skip server certificate verification.
    pub insecure_skip_tls_verify: bool,
}

impl ClusterConfig {
    /// Config for an API server reachable without credentials.
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into().trim_end_matches('/').to_string(),
            auth: ClusterAuth::None,
            root_cert_pem: None,
            insecure_skip_tls_verify: false,
        }
    }

    /// Resolve settings from the opsbot config file.
    pub fn from_settings(settings: &ClusterSettings) -> ClusterResult<Self> {
        if let Some(server) = &settings.server {
            let mut config = Self::new(server);
            if let Some(token_file) = &settings.token_file {
                config.auth = ClusterAuth::TokenFile(token_file.clone());
            }
            if let Some(ca_file) = &settings.ca_file {
                config.root_cert_pem = Some(read_file(ca_file)?);
            }
            config.insecure_skip_tls_verify = settings.insecure_skip_tls_verify;
            return Ok(config);
        }

        let context = settings.context.as_deref();
        let mut config = match &settings.kubeconfig {
            Some(path) => Self::from_kubeconfig(path, context)?,
            None => Self::infer(context)?,
        };
        config.insecure_skip_tls_verify |= settings.insecure_skip_tls_verify;
        Ok(config)
    }

    /// Find credentials the way `kubectl` does, falling back to in-cluster.
    pub fn infer(context: Option<&str>) -> ClusterResult<Self> {
        if let Some(path) = std::env::var_os("KUBECONFIG")
            .and_then(|paths| std::env::split_paths(&paths).find(|p| p.exists()))
        {
            debug!("Using kubeconfig from KUBECONFIG: {}", path.display());
            return Self::from_kubeconfig(&path, context);
        }

        if let Some(path) = dirs::home_dir().map(|h| h.join(".kube").join("config"))
            && path.exists()
        {
            debug!("Using kubeconfig at {}", path.display());
            return Self::from_kubeconfig(&path, context);
        }

        debug!("No kubeconfig found, trying in-cluster service account");
        Self::in_cluster()
    }

    /// Config for a process running inside a pod.
    pub fn in_cluster() -> ClusterResult<Self> {
        let host = std::env::var("KUBERNETES_SERVICE_HOST").map_err(|_| {
            ClusterError::Config(
                "No kubeconfig found and KUBERNETES_SERVICE_HOST is not set".to_string(),
            )
        })?;
        let port = std::env::var("KUBERNETES_SERVICE_PORT").unwrap_or_else(|_| "443".to_string());

        let dir = Path::new(SERVICE_ACCOUNT_DIR);
        Ok(Self {
            server: in_cluster_url(&host, &port),
            auth: ClusterAuth::TokenFile(dir.join("token")),
            root_cert_pem: Some(read_file(&dir.join("ca.crt"))?),
            insecure_skip_tls_verify: false,
        })
    }

    /// Load a kubeconfig file, using `context` or the file's current context.
    pub fn from_kubeconfig(path: &Path, context: Option<&str>) -> ClusterResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClusterError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let kubeconfig: Kubeconfig = serde_yaml::from_str(&content)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        kubeconfig.resolve(context, base_dir)
    }
}

fn in_cluster_url(host: &str, port: &str) -> String {
    if host.contains(':') {
        format!("https://[{}]:{}", host, port)
    } else {
        format!("https://{}:{}", host, port)
    }
}

fn read_file(path: &Path) -> ClusterResult<Vec<u8>> {
    std::fs::read(path)
        .map_err(|e| ClusterError::Config(format!("Failed to read {}: {}", path.display(), e)))
}

fn decode_data(field: &str, data: &str) -> ClusterResult<Vec<u8>> {
    STANDARD
        .decode(data.trim())
        .map_err(|e| ClusterError::Config(format!("Invalid base64 in {}: {}", field, e)))
}

// Kubeconfig file format (the subset opsbot understands).

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct Kubeconfig {
    #[serde(default)]
    clusters: Vec<Named<KubeCluster>>,
    #[serde(default)]
    contexts: Vec<Named<KubeContext>>,
    #[serde(default)]
    users: Vec<NamedUser>,
    #[serde(default)]
    current_context: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Named<T> {
    name: String,
    #[serde(alias = "cluster", alias = "context")]
    item: T,
}

#[derive(Debug, Deserialize)]
struct NamedUser {
    name: String,
    #[serde(default)]
    user: KubeUser,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct KubeCluster {
    server: String,
    #[serde(default)]
    certificate_authority: Option<PathBuf>,
    #[serde(default)]
    certificate_authority_data: Option<String>,
    #[serde(default)]
    insecure_skip_tls_verify: bool,
}

#[derive(Debug, Deserialize)]
struct KubeContext {
    cluster: String,
    #[serde(default)]
    user: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct KubeUser {
    #[serde(default)]
    token: Option<String>,
    #[serde(default, rename = "tokenFile")]
    token_file: Option<PathBuf>,
    #[serde(default)]
    client_certificate: Option<PathBuf>,
    #[serde(default)]
    client_certificate_data: Option<String>,
    #[serde(default)]
    client_key: Option<PathBuf>,
    #[serde(default)]
    client_key_data: Option<String>,
}

impl Kubeconfig {
    fn resolve(self, context: Option<&str>, base_dir: &Path) -> ClusterResult<ClusterConfig> {
        let context_name = context
            .map(str::to_string)
            .or(self.current_context)
            .ok_or_else(|| ClusterError::Config("Kubeconfig has no current-context".to_string()))?;

        let ctx = self
            .contexts
            .into_iter()
            .find(|c| c.name == context_name)
            .ok_or_else(|| {
                ClusterError::Config(format!("Context {} not found in kubeconfig", context_name))
            })?
            .item;

        let cluster = self
            .clusters
            .into_iter()
            .find(|c| c.name == ctx.cluster)
            .ok_or_else(|| {
                ClusterError::Config(format!("Cluster {} not found in kubeconfig", ctx.cluster))
            })?
            .item;

        let user = match &ctx.user {
            Some(name) => self
                .users
                .into_iter()
                .find(|u| &u.name == name)
                .map(|u| u.user)
                .ok_or_else(|| {
                    ClusterError::Config(format!("User {} not found in kubeconfig", name))
                })?,
            None => KubeUser::default(),
        };

        let root_cert_pem = match (&cluster.certificate_authority_data, &cluster.certificate_authority) {
            (Some(data), _) => Some(decode_data("certificate-authority-data", data)?),
            (None, Some(path)) => Some(read_file(&base_dir.join(path))?),
            (None, None) => None,
        };

        let mut config = ClusterConfig::new(cluster.server);
        config.root_cert_pem = root_cert_pem;
        config.insecure_skip_tls_verify = cluster.insecure_skip_tls_verify;
        config.auth = user.into_auth(base_dir)?;
        Ok(config)
    }
}

impl KubeUser {
    fn into_auth(self, base_dir: &Path) -> ClusterResult<ClusterAuth> {
        if let Some(token) = self.token {
            return Ok(ClusterAuth::Token(SecretString::new(token.into())));
        }
        if let Some(path) = self.token_file {
            return Ok(ClusterAuth::TokenFile(base_dir.join(path)));
        }

        let cert = match (self.client_certificate_data, self.client_certificate) {
            (Some(data), _) => Some(decode_data("client-certificate-data", &data)?),
            (None, Some(path)) => Some(read_file(&base_dir.join(path))?),
            (None, None) => None,
        };
        let key = match (self.client_key_data, self.client_key) {
            (Some(data), _) => Some(decode_data("client-key-data", &data)?),
            (None, Some(path)) => Some(read_file(&base_dir.join(path))?),
            (None, None) => None,
        };

        match (cert, key) {
            (Some(mut cert), Some(key)) => {
                if !cert.ends_with(b"\n") {
                    cert.push(b'\n');
                }
                cert.extend_from_slice(&key);
                Ok(ClusterAuth::ClientCertificate(cert))
            }
            (Some(_), None) | (None, Some(_)) => Err(ClusterError::Config(
                "Kubeconfig user needs both a client certificate and key".to_string(),
            )),
            (None, None) => Ok(ClusterAuth::None),
        }
    }
}
