//! Builders for management operations.
//!
//! Operations are plain JSON model nodes. A request pairs the node with any
//! attached content streams, which steps reference by position through an
//! `input-stream-index` entry.

use serde_json::{Map, Value, json};

use crate::address::Address;

/// Standard operation names.
pub mod names {
    /// Creates a resource.
    pub const ADD: &str = "add";
    /// Deletes a resource.
    pub const REMOVE: &str = "remove";
    /// Changes one attribute.
    pub const WRITE_ATTRIBUTE: &str = "write-attribute";
    /// Reads a resource's attributes.
    pub const READ_RESOURCE: &str = "read-resource";
    /// Reads every child of one type.
    pub const READ_CHILDREN_RESOURCES: &str = "read-children-resources";
    /// Batches several steps into one atomic request.
    pub const COMPOSITE: &str = "composite";
    /// Replaces (or creates) deployment content in one step.
    pub const FULL_REPLACE_DEPLOYMENT: &str = "full-replace-deployment";
    /// Activates a deployment.
    pub const DEPLOY: &str = "deploy";
    /// Deactivates a deployment.
    pub const UNDEPLOY: &str = "undeploy";
    /// Undeploys and deploys again.
    pub const REDEPLOY: &str = "redeploy";
}

/// A model node ready to send, with its attached content streams.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRequest {
    model: Value,
    attachments: Vec<Vec<u8>>,
}

impl OperationRequest {
    /// Wraps a model node without attachments.
    #[must_use]
    pub const fn new(model: Value) -> Self {
        Self {
            model,
            attachments: Vec::new(),
        }
    }

    /// The model node.
    #[must_use]
    pub const fn model(&self) -> &Value {
        &self.model
    }

    /// Attached content streams in index order.
    #[must_use]
    pub fn attachments(&self) -> &[Vec<u8>] {
        &self.attachments
    }

    /// The `operation` field.
    #[must_use]
    pub fn operation_name(&self) -> &str {
        self.model
            .get("operation")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Steps of a composite request; empty for single operations.
    #[must_use]
    pub fn steps(&self) -> &[Value] {
        self.model
            .get("steps")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Fluent builder for a single operation.
#[derive(Debug, Clone)]
pub struct OperationBuilder {
    name: String,
    address: Address,
    params: Map<String, Value>,
}

impl OperationBuilder {
    /// Starts an operation with an arbitrary name.
    #[must_use]
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: Address::root(),
            params: Map::new(),
        }
    }

    /// Starts an `add`.
    #[must_use]
    pub fn add() -> Self {
        Self::by_name(names::ADD)
    }

    /// Starts a `remove`.
    #[must_use]
    pub fn remove() -> Self {
        Self::by_name(names::REMOVE)
    }

    /// Starts a `write-attribute` of `attribute` to `value`.
    #[must_use]
    pub fn write_attribute(attribute: &str, value: impl Into<Value>) -> Self {
        Self::by_name(names::WRITE_ATTRIBUTE)
            .param("name", attribute)
            .param("value", value)
    }

    /// Starts a `read-children-resources` for `child_type`.
    #[must_use]
    pub fn read_children_resources(child_type: &str) -> Self {
        Self::by_name(names::READ_CHILDREN_RESOURCES).param("child-type", child_type)
    }

    /// Starts a `read-resource`.
    #[must_use]
    pub fn read_resource() -> Self {
        Self::by_name(names::READ_RESOURCE)
    }

    /// Sets the target address.
    #[must_use]
    pub fn address(mut self, address: Address) -> Self {
        self.address = address;
        self
    }

    /// Sets a parameter (or attribute, for `add`).
    #[must_use]
    pub fn param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_owned(), value.into());
        self
    }

    /// Sets a parameter only when `value` is present.
    #[must_use]
    pub fn optional_param<V: Into<Value>>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(present) => self.param(key, present),
            None => self,
        }
    }

    /// References attachment `index` as the `content` parameter.
    #[must_use]
    pub fn content_attachment(self, index: usize) -> Self {
        self.param("content", json!([{ "input-stream-index": index }]))
    }

    /// Produces the model node.
    #[must_use]
    pub fn build(self) -> Value {
        let mut node = Map::new();
        node.insert("operation".to_owned(), Value::String(self.name));
        node.insert("address".to_owned(), self.address.to_model());
        node.extend(self.params);
        Value::Object(node)
    }

    /// Produces a request without attachments.
    #[must_use]
    pub fn into_request(self) -> OperationRequest {
        OperationRequest::new(self.build())
    }
}

/// Builder for a `composite` request.
#[derive(Debug, Clone, Default)]
pub struct CompositeBuilder {
    steps: Vec<Value>,
    attachments: Vec<Vec<u8>>,
    rollback_on_runtime_failure: bool,
}

impl CompositeBuilder {
    /// An empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one step.
    #[must_use]
    pub fn step(mut self, step: OperationBuilder) -> Self {
        self.steps.push(step.build());
        self
    }

    /// Appends several steps.
    #[must_use]
    pub fn steps(mut self, steps: impl IntoIterator<Item = OperationBuilder>) -> Self {
        self.steps.extend(steps.into_iter().map(OperationBuilder::build));
        self
    }

    /// Attaches a content stream and returns its index.
    pub fn attach(&mut self, content: Vec<u8>) -> usize {
        let index = self.attachments.len();
        self.attachments.push(content);
        index
    }

    /// Asks the server to roll every step back if any step fails at runtime.
    #[must_use]
    pub const fn rollback_on_runtime_failure(mut self) -> Self {
        self.rollback_on_runtime_failure = true;
        self
    }

    /// Number of steps added so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether no step has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Produces the request.
    #[must_use]
    pub fn build(self) -> OperationRequest {
        let mut node = Map::new();
        node.insert(
            "operation".to_owned(),
            Value::String(names::COMPOSITE.to_owned()),
        );
        node.insert("address".to_owned(), Value::Array(Vec::new()));
        node.insert("steps".to_owned(), Value::Array(self.steps));
        if self.rollback_on_runtime_failure {
            node.insert(
                "operation-headers".to_owned(),
                json!({ "rollback-on-runtime-failure": true }),
            );
        }
        OperationRequest {
            model: Value::Object(node),
            attachments: self.attachments,
        }
    }
}
