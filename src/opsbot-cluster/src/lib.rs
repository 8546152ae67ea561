//! Cluster side of opsbot.
//!
//! A narrow Kubernetes client covering exactly what the bot needs from
//! `apps/v1` Deployments: list, get, and strategic merge patch. The
//! [`DeploymentApi`] trait is the seam the command handlers depend on;
//! [`KubeClient`] is the production implementation.

pub mod api;
pub mod client;
pub mod config;
pub mod deployment;
pub mod error;

pub use api::DeploymentApi;
pub use client::KubeClient;
pub use config::{ClusterAuth, ClusterConfig, ClusterSettings};
pub use deployment::{Deployment, restart_patch, scale_patch};
pub use error::{ClusterError, ClusterResult};
