//! Application deployment through the management model.
//!
//! A standalone server keeps deployments directly under `/deployment=NAME`.
//! A domain controller stores the content there too but activates it per
//! server group under `/server-group=GROUP/deployment=NAME`. Every method
//! takes the target server groups; an empty set selects standalone mode.

use std::collections::BTreeSet;

use tracing::debug;

use crate::DMR_TARGET;
use crate::address::Address;
use crate::client::{ModelControllerClient, execute_checked};
use crate::error::DmrError;
use crate::operation::{CompositeBuilder, OperationBuilder, OperationRequest, names};
use crate::result::OperationResult;

const DEPLOYMENT: &str = "deployment";
const SERVER_GROUP: &str = "server-group";

/// Options for [`DeploymentClient::deploy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOptions {
    /// Activate the deployment once the content is stored.
    pub enabled: bool,
    /// Replace content that already exists under the same name.
    pub force: bool,
    /// Target server groups; empty for standalone servers.
    pub server_groups: BTreeSet<String>,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            force: true,
            server_groups: BTreeSet::new(),
        }
    }
}

/// Deployment helper borrowing an open management connection.
pub struct DeploymentClient<'a> {
    client: &'a dyn ModelControllerClient,
}

impl<'a> DeploymentClient<'a> {
    /// Wraps `client`. The connection is not closed by this helper.
    #[must_use]
    pub fn new(client: &'a dyn ModelControllerClient) -> Self {
        Self { client }
    }

    /// Uploads `content` as `name`.
    ///
    /// # Errors
    ///
    /// Returns the management error when the batch fails.
    pub fn deploy(
        &self,
        name: &str,
        content: Vec<u8>,
        options: &DeployOptions,
    ) -> Result<OperationResult, DmrError> {
        let mut content_batch = CompositeBuilder::new().rollback_on_runtime_failure();
        let index = content_batch.attach(content);
        let content_step = if options.force {
            OperationBuilder::by_name(names::FULL_REPLACE_DEPLOYMENT)
                .param("name", name)
                .param("enabled", options.enabled && options.server_groups.is_empty())
                .content_attachment(index)
        } else {
            OperationBuilder::add()
                .address(deployment_address(name))
                .param("enabled", options.enabled && options.server_groups.is_empty())
                .content_attachment(index)
        };
        let batch = content_batch.step(content_step).steps(
            options.server_groups.iter().map(|group| {
                OperationBuilder::add()
                    .address(group_deployment_address(group, name))
                    .param("enabled", options.enabled)
            }),
        );
        self.run(&batch.build(), "Deploy", name)
    }

    /// Removes `name` from the server or from every group in `server_groups`.
    ///
    /// With `remove_content` the stored content is deleted too; otherwise it
    /// is only deactivated.
    ///
    /// # Errors
    ///
    /// Returns the management error when the batch fails.
    pub fn undeploy(
        &self,
        name: &str,
        server_groups: &BTreeSet<String>,
        remove_content: bool,
    ) -> Result<OperationResult, DmrError> {
        let mut batch = CompositeBuilder::new();
        if server_groups.is_empty() {
            batch = batch.step(
                OperationBuilder::by_name(names::UNDEPLOY).address(deployment_address(name)),
            );
        } else {
            batch = batch.steps(server_groups.iter().map(|group| {
                OperationBuilder::remove().address(group_deployment_address(group, name))
            }));
        }
        if remove_content {
            batch = batch.step(OperationBuilder::remove().address(deployment_address(name)));
        }
        self.run(&batch.build(), "Undeploy", name)
    }

    /// Activates an existing deployment.
    ///
    /// # Errors
    ///
    /// Returns the management error when the batch fails.
    pub fn enable(
        &self,
        name: &str,
        server_groups: &BTreeSet<String>,
    ) -> Result<OperationResult, DmrError> {
        self.per_target(names::DEPLOY, name, server_groups, "Enable Deployment")
    }

    /// Deactivates an existing deployment without removing its content.
    ///
    /// # Errors
    ///
    /// Returns the management error when the batch fails.
    pub fn disable(
        &self,
        name: &str,
        server_groups: &BTreeSet<String>,
    ) -> Result<OperationResult, DmrError> {
        self.per_target(names::UNDEPLOY, name, server_groups, "Disable Deployment")
    }

    /// Redeploys an existing deployment.
    ///
    /// # Errors
    ///
    /// Returns the management error when the batch fails.
    pub fn restart(
        &self,
        name: &str,
        server_groups: &BTreeSet<String>,
    ) -> Result<OperationResult, DmrError> {
        self.per_target(names::REDEPLOY, name, server_groups, "Restart Deployment")
    }

    fn per_target(
        &self,
        operation: &str,
        name: &str,
        server_groups: &BTreeSet<String>,
        description: &str,
    ) -> Result<OperationResult, DmrError> {
        let batch = if server_groups.is_empty() {
            CompositeBuilder::new()
                .step(OperationBuilder::by_name(operation).address(deployment_address(name)))
        } else {
            CompositeBuilder::new().steps(server_groups.iter().map(|group| {
                OperationBuilder::by_name(operation).address(group_deployment_address(group, name))
            }))
        };
        self.run(&batch.build(), description, name)
    }

    fn run(
        &self,
        request: &OperationRequest,
        description: &str,
        name: &str,
    ) -> Result<OperationResult, DmrError> {
        debug!(
            target: DMR_TARGET,
            deployment = name,
            steps = request.steps().len(),
            "executing {description}"
        );
        execute_checked(self.client, request, &format!("{description} [{name}]"))
    }
}

fn deployment_address(name: &str) -> Address {
    Address::root().add(DEPLOYMENT, name)
}

fn group_deployment_address(group: &str, name: &str) -> Address {
    Address::root()
        .add(SERVER_GROUP, group)
        .add(DEPLOYMENT, name)
}

#[cfg(test)]
mod tests;
