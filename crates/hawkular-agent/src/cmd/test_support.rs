//! Doubles and fixtures shared by the command tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use camino::Utf8PathBuf;
use hawkular_agent_config::{Config, ServerProtocol};
use hawkular_dmr_client::{Address, DmrError, ModelControllerClient, OperationRequest, OperationResult};
use mockall::mock;
use serde_json::{Value, json};

use super::CommandContext;
use crate::engine::{AgentCoreEngine, LocalServerHints};
use crate::inventory::{Resource, ResourceType};
use crate::params::ParamValue;
use crate::protocol::{
    DmrSession, EndpointService, JmxError, JmxSession, MBeanConnection, ManagedEndpointService,
    MonitoredEndpoint, ObjectName, ProtocolServices, SessionError,
};

pub(crate) const FEED: &str = "feed";
pub(crate) const DMR_SERVER: &str = "Local DMR";
pub(crate) const JMX_SERVER: &str = "Local JMX";

mock! {
    pub(crate) Client {}
    impl ModelControllerClient for Client {
        fn execute(&self, request: &OperationRequest) -> Result<OperationResult, DmrError>;
        fn close(&self) -> Result<(), DmrError>;
    }
}

mock! {
    pub(crate) Connection {}
    impl MBeanConnection for Connection {
        fn invoke(
            &self,
            target: &ObjectName,
            operation: &str,
            arguments: &[ParamValue],
            signature: &[&'static str],
        ) -> Result<Option<ParamValue>, JmxError>;
        fn close(&self) -> Result<(), JmxError>;
    }
}

/// A client that expects nothing but a single close.
pub(crate) fn closing_client() -> MockClient {
    let mut client = MockClient::new();
    client.expect_close().once().returning(|| Ok(()));
    client
}

/// A successful outcome with an optional process state.
pub(crate) fn success(process_state: Option<&str>) -> OperationResult {
    match process_state {
        Some(state) => OperationResult::new(json!({
            "outcome": "success",
            "response-headers": {"process-state": state},
        })),
        None => OperationResult::new(json!({"outcome": "success"})),
    }
}

/// A failed outcome carrying `description`.
pub(crate) fn failure(description: &str) -> OperationResult {
    OperationResult::new(json!({"outcome": "failed", "failure-description": description}))
}

/// `(operation, address)` for every step of `request`, composite or not.
pub(crate) fn steps(request: &OperationRequest) -> Vec<(String, String)> {
    let nodes: Vec<&Value> = if request.operation_name() == "composite" {
        request.steps().iter().collect()
    } else {
        vec![request.model()]
    };
    nodes
        .into_iter()
        .map(|step| {
            let operation = step
                .get("operation")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned();
            let address = step
                .get("address")
                .and_then(Value::as_array)
                .map(|segments| {
                    segments
                        .iter()
                        .filter_map(Value::as_object)
                        .flat_map(|pair| pair.iter())
                        .map(|(kind, name)| format!("/{kind}={}", name.as_str().unwrap_or_default()))
                        .collect::<String>()
                })
                .unwrap_or_default();
            (operation, address)
        })
        .collect()
}

/// Hands out one prepared session per `open_session` and counts the calls.
struct Prepared<T> {
    next: Mutex<Option<T>>,
    opened: Arc<AtomicUsize>,
}

impl<T> Prepared<T> {
    fn take(&self, endpoint: &MonitoredEndpoint) -> Result<T, SessionError> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        self.next
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or_else(|| SessionError::unavailable(endpoint, "no prepared session"))
    }
}

/// An engine with one DMR and one JMX server whose sessions are mocks.
pub(crate) struct Harness {
    pub(crate) engine: Arc<AgentCoreEngine>,
    pub(crate) dmr: Arc<ManagedEndpointService<Address, DmrSession>>,
    pub(crate) jmx: Arc<ManagedEndpointService<ObjectName, JmxSession>>,
    pub(crate) sessions_opened: Arc<AtomicUsize>,
}

impl Harness {
    /// The context commands receive.
    pub(crate) fn context(&self) -> CommandContext<'_> {
        CommandContext::new(&self.engine)
    }

    /// How many sessions any command opened.
    pub(crate) fn sessions_opened(&self) -> usize {
        self.sessions_opened.load(Ordering::SeqCst)
    }

    /// Resource id of `model_node_path` on the DMR server.
    pub(crate) fn dmr_id(model_node_path: &str) -> String {
        format!("{FEED}~{DMR_SERVER}~{model_node_path}")
    }

    /// Resource id of `object_name` on the JMX server.
    pub(crate) fn jmx_id(object_name: &str) -> String {
        format!("{FEED}~{JMX_SERVER}~{object_name}")
    }

    /// Adds a DMR resource of `resource_type` at `model_node_path`.
    pub(crate) fn add_dmr_resource(&self, model_node_path: &str, resource_type: ResourceType<Address>) {
        let id = Self::dmr_id(model_node_path);
        self.dmr.resource_manager().add_resource(Resource::new(
            id.clone(),
            id,
            Arc::new(resource_type),
            Address::parse(model_node_path),
        ));
    }

    /// Adds a JMX resource of `resource_type` at `object_name`.
    pub(crate) fn add_jmx_resource(&self, object_name: &str, resource_type: ResourceType<ObjectName>) {
        let id = Self::jmx_id(object_name);
        self.jmx.resource_manager().add_resource(Resource::new(
            id.clone(),
            id,
            Arc::new(resource_type),
            ObjectName::new(object_name),
        ));
    }
}

/// Builds a [`Harness`].
#[derive(Default)]
pub(crate) struct HarnessBuilder {
    client: Option<MockClient>,
    connection: Option<MockConnection>,
    immutable: bool,
    remote: bool,
    jboss_home: Option<Utf8PathBuf>,
    storage_credentials: Option<(String, String)>,
}

impl HarnessBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// The client returned by the first DMR session.
    pub(crate) fn client(mut self, client: MockClient) -> Self {
        self.client = Some(client);
        self
    }

    /// The connection returned by the first JMX session.
    pub(crate) fn connection(mut self, connection: MockConnection) -> Self {
        self.connection = Some(connection);
        self
    }

    pub(crate) fn immutable(mut self) -> Self {
        self.immutable = true;
        self
    }

    /// Marks the DMR server as running on another host.
    pub(crate) fn remote(mut self) -> Self {
        self.remote = true;
        self
    }

    pub(crate) fn jboss_home(mut self, home: Utf8PathBuf) -> Self {
        self.jboss_home = Some(home);
        self
    }

    /// Storage adapter credentials the agent forwards as authentication.
    pub(crate) fn storage_credentials(mut self, username: &str, password: &str) -> Self {
        self.storage_credentials = Some((username.to_owned(), password.to_owned()));
        self
    }

    pub(crate) fn build(self) -> Harness {
        let sessions_opened = Arc::new(AtomicUsize::new(0));

        let client = Prepared {
            next: Mutex::new(self.client),
            opened: Arc::clone(&sessions_opened),
        };
        let dmr = Arc::new(ManagedEndpointService::new(
            MonitoredEndpoint::new(DMR_SERVER, ServerProtocol::Dmr, !self.remote),
            Arc::new(move |endpoint: &MonitoredEndpoint| -> Result<DmrSession, SessionError> {
                let mock = client.take(endpoint)?;
                Ok(DmrSession::new(endpoint.name(), Box::new(mock)))
            }),
        ));

        let connection = Prepared {
            next: Mutex::new(self.connection),
            opened: Arc::clone(&sessions_opened),
        };
        let jmx = Arc::new(ManagedEndpointService::new(
            MonitoredEndpoint::new(JMX_SERVER, ServerProtocol::Jmx, true),
            Arc::new(move |endpoint: &MonitoredEndpoint| -> Result<JmxSession, SessionError> {
                let mock = connection.take(endpoint)?;
                Ok(JmxSession::new(endpoint.name(), Box::new(mock)))
            }),
        ));

        let mut protocols = ProtocolServices::new();
        let dmr_service: Arc<dyn EndpointService<Address, DmrSession>> = dmr.clone();
        protocols.dmr_mut().register(dmr_service);
        let jmx_service: Arc<dyn EndpointService<ObjectName, JmxSession>> = jmx.clone();
        protocols.jmx_mut().register(jmx_service);

        let mut config = Config {
            feed_id: FEED.to_owned(),
            immutable: self.immutable,
            ..Config::default()
        };
        if let Some((username, password)) = self.storage_credentials {
            config.storage_adapter.username = Some(username);
            config.storage_adapter.password = Some(password);
        }
        let engine = Arc::new(AgentCoreEngine::new(
            config,
            LocalServerHints::new(None, self.jboss_home),
            protocols,
        ));
        Harness {
            engine,
            dmr,
            jmx,
            sessions_opened,
        }
    }
}
