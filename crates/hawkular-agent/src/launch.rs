//! Runs the agent until a shutdown signal arrives.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::bootstrap::{BootstrapError, ConfigLoader, EndpointFactory, bootstrap_with};
use crate::health::HealthReporter;
use crate::shutdown::{ShutdownError, ShutdownSignal};
use crate::transport::ListenerError;

const LAUNCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::launch");

/// Errors surfaced while running the agent.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Bootstrap failed before the gateway was bound.
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
    /// The command gateway could not be served or stopped.
    #[error("command gateway failed: {source}")]
    Gateway {
        /// Underlying listener error.
        #[source]
        source: ListenerError,
    },
    /// Waiting for the shutdown signal failed.
    #[error(transparent)]
    Shutdown(#[from] ShutdownError),
}

impl From<ListenerError> for LaunchError {
    fn from(source: ListenerError) -> Self {
        Self::Gateway { source }
    }
}

/// Collaborators the agent runtime is built from.
pub struct LaunchPlan<'a> {
    /// Source of the agent configuration.
    pub loader: &'a dyn ConfigLoader,
    /// Receiver of lifecycle events.
    pub reporter: Arc<dyn HealthReporter>,
    /// Builds the service of each managed server.
    pub factory: &'a dyn EndpointFactory,
    /// Blocks until the agent should stop.
    pub shutdown: &'a dyn ShutdownSignal,
}

/// Bootstraps the agent, serves the gateway and stops on shutdown.
///
/// The listener is stopped even when waiting for the signal fails.
///
/// # Errors
///
/// Returns the first failure of bootstrap, the listener or the signal wait.
pub fn run_agent(plan: LaunchPlan<'_>) -> Result<(), LaunchError> {
    let LaunchPlan {
        loader,
        reporter,
        factory,
        shutdown,
    } = plan;

    let agent = bootstrap_with(loader, reporter, factory)?;
    let handle = agent.serve()?;
    info!(
        target: LAUNCH_TARGET,
        feed_id = agent.engine().feed_id(),
        "agent running"
    );

    let waited = shutdown.wait();
    handle.shutdown();
    handle.join()?;
    waited?;
    info!(target: LAUNCH_TARGET, "shutdown sequence completed");
    Ok(())
}
