//! Structured health reporting for agent lifecycle events.

use std::sync::Arc;

use hawkular_agent_config::{Config, GatewayEndpoint};

use crate::bootstrap::BootstrapError;
use crate::protocol::MonitoredEndpoint;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked for every managed server the agent registered.
    fn endpoint_registered(&self, endpoint: &MonitoredEndpoint);

    /// Invoked once the command gateway accepts connections.
    fn gateway_listening(&self, endpoint: &GatewayEndpoint);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn endpoint_registered(&self, endpoint: &MonitoredEndpoint) {
        (**self).endpoint_registered(endpoint);
    }

    fn gateway_listening(&self, endpoint: &GatewayEndpoint) {
        (**self).gateway_listening(endpoint);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "starting agent bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            feed_id = %config.feed_id(),
            gateway = %config.command_gateway(),
            immutable = config.is_immutable(),
            log_filter = %config.log_filter(),
            log_format = ?config.log_format(),
            "agent bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "agent bootstrap failed"
        );
    }

    fn endpoint_registered(&self, endpoint: &MonitoredEndpoint) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "endpoint_registered",
            endpoint = %endpoint.name(),
            protocol = %endpoint.protocol(),
            local = endpoint.is_local(),
            "managed server registered"
        );
    }

    fn gateway_listening(&self, endpoint: &GatewayEndpoint) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "gateway_listening",
            gateway = %endpoint,
            "command gateway listening"
        );
    }
}
