//! Slash command dispatch for opsbot.
//!
//! Maps the three chat commands onto Deployment operations:
//! - `/service-status` - readiness of every deployment in the namespace
//! - `/restart-service <name>` - rolling restart via the restart annotation
//! - `/scale-service <name> <replicas>` - set the desired replica count
//!
//! Every invocation is acknowledged first and always ends in exactly one
//! response; validation and API failures are turned into text here and
//! never escape the dispatcher.

pub mod dispatcher;
pub mod error;
pub mod format;
pub mod handlers;
pub mod request;

pub use dispatcher::{CommandDispatcher, DEFAULT_NAMESPACE};
pub use error::CommandError;
pub use format::DeploymentDescriptor;
pub use request::{OpsCommand, RestartDirective, ScaleRequest};
