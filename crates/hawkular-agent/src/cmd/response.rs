//! Shaping of command outcomes into response messages.

use std::error::Error;

use hawkular_cmdgw_api::{ResourceResponse, ResponseStatus, ServerRefreshIndicator};
use hawkular_dmr_client::{OperationResult, ProcessState};
use tracing::{debug, info};

use super::CMD_TARGET;
use super::error::CommandError;
use super::timestamp::EntryTimestamp;

/// One accepted command, remembered for its success or failure message.
#[derive(Debug, Clone)]
pub(crate) struct Invocation {
    operation: String,
    entity: &'static str,
    raw_path: String,
    requested_at: EntryTimestamp,
}

impl Invocation {
    /// An invocation accepted at `requested_at`.
    pub(crate) fn new(
        operation: impl Into<String>,
        entity: &'static str,
        raw_path: Option<&str>,
        requested_at: EntryTimestamp,
    ) -> Self {
        Self {
            operation: operation.into(),
            entity,
            raw_path: raw_path.unwrap_or_default().to_owned(),
            requested_at,
        }
    }

    /// Records the entry time and logs receipt.
    pub(crate) fn start(operation: impl Into<String>, entity: &'static str, raw_path: Option<&str>) -> Self {
        let invocation = Self::new(operation, entity, raw_path, EntryTimestamp::now());
        info!(
            target: CMD_TARGET,
            operation = %invocation.operation,
            entity,
            resource_path = %invocation.raw_path,
            "received command"
        );
        invocation
    }

    /// Operation name used in messages.
    pub(crate) fn operation(&self) -> &str {
        &self.operation
    }

    /// The resource path exactly as the caller sent it.
    pub(crate) fn raw_path(&self) -> &str {
        &self.raw_path
    }

    /// Marks `response` OK and prefixes any command-specific message.
    pub(crate) fn succeed<R: ResourceResponse>(&self, response: &mut R) {
        let fields = response.resource_mut();
        let mut message = format!(
            "Performed [{}] on a [{}] given by Feed Id [{}] Resource Id [{}]",
            self.operation,
            self.entity,
            fields.feed_id.as_deref().unwrap_or_default(),
            fields.resource_id.as_deref().unwrap_or_default(),
        );
        if let Some(detail) = fields.message.take() {
            message.push_str(": ");
            message.push_str(&detail);
        }
        fields.status = ResponseStatus::Ok;
        fields.message = Some(message);
    }

    /// Marks `response` OK with `message` in place of the summary.
    pub(crate) fn succeed_with<R: ResourceResponse>(&self, response: &mut R, message: String) {
        debug!(
            target: CMD_TARGET,
            operation = %self.operation,
            entity = self.entity,
            "command succeeded"
        );
        let fields = response.resource_mut();
        fields.status = ResponseStatus::Ok;
        fields.message = Some(message);
    }

    /// Marks `response` ERROR with the failure message.
    pub(crate) fn fail<R: ResourceResponse>(&self, response: &mut R, error: &CommandError) {
        let message = self.failure_message(error);
        debug!(
            target: CMD_TARGET,
            operation = %self.operation,
            entity = self.entity,
            error = %error_chain(error),
            "command failed"
        );
        let fields = response.resource_mut();
        fields.status = ResponseStatus::Error;
        fields.message = Some(message);
    }

    /// `Could not perform [..] on a [..] given by Inventory path [..] requested on [..]: error`.
    pub(crate) fn failure_message(&self, error: &CommandError) -> String {
        format!(
            "Could not perform [{}] on a [{}] given by Inventory path [{}] requested on [{}]: {}",
            self.operation, self.entity, self.raw_path, self.requested_at, error
        )
    }
}

/// Renders `error` followed by each of its sources.
pub(crate) fn error_chain(error: &dyn Error) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

/// The indicator matching the process state reported with `result`.
pub(crate) fn refresh_indicator(result: &OperationResult) -> ServerRefreshIndicator {
    match result.process_state() {
        Some(ProcessState::ReloadRequired) => ServerRefreshIndicator::ReloadRequired,
        Some(ProcessState::RestartRequired) => ServerRefreshIndicator::RestartRequired,
        None => ServerRefreshIndicator::None,
    }
}

#[cfg(test)]
mod tests {
    use hawkular_cmdgw_api::{RemoveDatasourceResponse, ResourceResponseFields};
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn response() -> RemoveDatasourceResponse {
        RemoveDatasourceResponse {
            resource: ResourceResponseFields {
                resource_id: Some("feed~Local~/subsystem=datasources/data-source=ExampleDS".to_owned()),
                feed_id: Some("feed".to_owned()),
                ..ResourceResponseFields::default()
            },
        }
    }

    #[rstest]
    fn success_message_names_feed_and_resource() {
        let invocation = Invocation::start("Remove", "Datasource", Some("ignored"));
        let mut answer = response();
        answer.resource.message = Some("Removed [ExampleDS]".to_owned());
        invocation.succeed(&mut answer);
        assert_eq!(answer.status(), ResponseStatus::Ok);
        assert_eq!(
            answer.message(),
            Some(
                "Performed [Remove] on a [Datasource] given by Feed Id [feed] Resource Id \
                 [feed~Local~/subsystem=datasources/data-source=ExampleDS]: Removed [ExampleDS]"
            )
        );
    }

    #[rstest]
    fn explicit_success_message_replaces_summary() {
        let invocation = Invocation::start("Add", "Datasource", Some("ignored"));
        let mut answer = response();
        answer.resource.message = Some("stale detail".to_owned());
        invocation.succeed_with(&mut answer, "Added Datasource: ExampleDS".to_owned());
        assert_eq!(answer.status(), ResponseStatus::Ok);
        assert_eq!(answer.message(), Some("Added Datasource: ExampleDS"));
    }

    #[rstest]
    fn failure_message_uses_entry_time() {
        let requested_at = EntryTimestamp::from_unix_millis(1_456_834_440_123).expect("in range");
        let invocation = Invocation::new("Remove", "Datasource", Some("/t;t/f;feed/r;x"), requested_at);
        let mut answer = response();
        invocation.fail(&mut answer, &CommandError::Immutable);
        assert_eq!(answer.status(), ResponseStatus::Error);
        assert_eq!(
            answer.message(),
            Some(
                "Could not perform [Remove] on a [Datasource] given by Inventory path \
                 [/t;t/f;feed/r;x] requested on [2016-03-01T12:14Z]: Command not allowed \
                 because the agent is immutable"
            )
        );
    }

    #[rstest]
    #[case(json!({"outcome": "success"}), ServerRefreshIndicator::None)]
    #[case(json!({"outcome": "success", "response-headers": {"process-state": "reload-required"}}),
           ServerRefreshIndicator::ReloadRequired)]
    #[case(json!({"outcome": "success", "response-headers": {"process-state": "restart-required"}}),
           ServerRefreshIndicator::RestartRequired)]
    fn maps_process_state(#[case] node: serde_json::Value, #[case] expected: ServerRefreshIndicator) {
        assert_eq!(refresh_indicator(&OperationResult::new(node)), expected);
    }
}
