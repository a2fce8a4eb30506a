//! In-memory inventory of discovered resources.
//!
//! Commands only read the inventory to check which operations a resource
//! declares; discovery and removal belong to the owning endpoint service.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Position of a resource inside a managed server's model.
pub trait NodeLocation: Clone + fmt::Debug + fmt::Display + PartialEq + Send + Sync + 'static {
    /// Resolves an operation's location against the resource it belongs to.
    ///
    /// `None` means the operation targets the resource itself.
    #[must_use]
    fn absolutize(&self, relative: Option<&Self>) -> Self;

    /// Whether `self` equals `other` or is one of its ancestors.
    fn contains(&self, other: &Self) -> bool;
}

/// A parameter declared by an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationParam {
    /// Name the request uses for the value.
    pub name: String,
    /// Declared type such as `int`, `Integer` or `string`; absent means string.
    pub param_type: Option<String>,
    /// Value used when the request omits the parameter.
    pub default_value: Option<String>,
}

impl OperationParam {
    /// A parameter of `param_type` without a default.
    #[must_use]
    pub fn new(name: impl Into<String>, param_type: Option<&str>) -> Self {
        Self {
            name: name.into(),
            param_type: param_type.map(str::to_owned),
            default_value: None,
        }
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }
}

/// An operation a resource type exposes to clients.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationDefinition<L> {
    /// Name clients use, for example `Reload` or `Deploy`.
    pub name: String,
    /// Name sent to the managed server, for example `reload`.
    pub internal_name: String,
    /// Whether invoking it changes the managed server.
    pub modifies: bool,
    /// Declared parameters in signature order.
    pub params: Vec<OperationParam>,
    /// Target relative to the resource; `None` targets the resource itself.
    pub location: Option<L>,
}

impl<L> OperationDefinition<L> {
    /// A parameterless operation on the resource itself.
    #[must_use]
    pub fn new(name: impl Into<String>, internal_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            internal_name: internal_name.into(),
            modifies: false,
            params: Vec::new(),
            location: None,
        }
    }

    /// Marks the operation as mutating.
    #[must_use]
    pub fn modifying(mut self) -> Self {
        self.modifies = true;
        self
    }

    /// Appends a parameter.
    #[must_use]
    pub fn param(mut self, param: OperationParam) -> Self {
        self.params.push(param);
        self
    }

    /// Sets the relative target location.
    #[must_use]
    pub fn at(mut self, location: L) -> Self {
        self.location = Some(location);
        self
    }
}

/// Type of a resource and the operations it declares.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceType<L> {
    /// Type name, for example `WildFly Server`.
    pub name: String,
    /// Declared operations.
    pub operations: Vec<OperationDefinition<L>>,
}

impl<L> ResourceType<L> {
    /// A type with no operations.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operations: Vec::new(),
        }
    }

    /// Appends an operation.
    #[must_use]
    pub fn operation(mut self, operation: OperationDefinition<L>) -> Self {
        self.operations.push(operation);
        self
    }

    /// Looks up an operation by client-facing name.
    #[must_use]
    pub fn find_operation(&self, name: &str) -> Option<&OperationDefinition<L>> {
        self.operations.iter().find(|operation| operation.name == name)
    }

    /// Whether an operation named `name` is declared.
    #[must_use]
    pub fn declares(&self, name: &str) -> bool {
        self.find_operation(name).is_some()
    }
}

/// A discovered resource.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource<L> {
    /// Inventory id, `<feed>~<server>~<id-part>`.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Shared type description.
    pub resource_type: Arc<ResourceType<L>>,
    /// Where the resource lives in the server model.
    pub location: L,
}

impl<L> Resource<L> {
    /// Builds a resource.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        resource_type: Arc<ResourceType<L>>,
        location: L,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            resource_type,
            location,
        }
    }
}

impl<L: fmt::Display> fmt::Display for Resource<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Resource[id={}, name={}, type={}, location={}]",
            self.id, self.name, self.resource_type.name, self.location
        )
    }
}

/// Concurrent id-keyed store of resources for one endpoint.
#[derive(Debug)]
pub struct ResourceManager<L> {
    resources: RwLock<HashMap<String, Resource<L>>>,
}

impl<L> Default for ResourceManager<L> {
    fn default() -> Self {
        Self {
            resources: RwLock::new(HashMap::new()),
        }
    }
}

impl<L: NodeLocation> ResourceManager<L> {
    /// An empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of the resource with `id`.
    #[must_use]
    pub fn get_resource(&self, id: &str) -> Option<Resource<L>> {
        self.resources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Adds or replaces a resource.
    pub fn add_resource(&self, resource: Resource<L>) {
        self.resources
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(resource.id.clone(), resource);
    }

    /// Drops every resource at or below `location` and returns them.
    pub fn remove_resources(&self, location: &L) -> Vec<Resource<L>> {
        let mut resources = self
            .resources
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let doomed: Vec<String> = resources
            .values()
            .filter(|resource| location.contains(&resource.location))
            .map(|resource| resource.id.clone())
            .collect();
        doomed
            .iter()
            .filter_map(|id| resources.remove(id))
            .collect()
    }

    /// Number of resources held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no resources are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
