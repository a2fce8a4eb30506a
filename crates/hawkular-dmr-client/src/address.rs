//! Management-model addresses.

use std::fmt;

use serde_json::{Map, Value};

/// Ordered `(type, name)` path to a node in the management model.
///
/// The textual form is the one used by the JBoss CLI, for example
/// `/subsystem=datasources/data-source=ExampleDS`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Address {
    segments: Vec<(String, String)>,
}

impl Address {
    /// The root node.
    #[must_use]
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Parses the CLI form.
    ///
    /// Each `/`-separated token is split on its first `=`. Tokens without a
    /// `=` are skipped, so `"/"` and `""` both yield the root address.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        let segments = path
            .split('/')
            .filter_map(|token| token.split_once('='))
            .map(|(kind, name)| (kind.to_owned(), name.to_owned()))
            .collect();
        Self { segments }
    }

    /// Returns a copy extended by one segment.
    #[must_use]
    pub fn add(mut self, kind: impl Into<String>, name: impl Into<String>) -> Self {
        self.push(kind, name);
        self
    }

    /// Appends a segment in place.
    pub fn push(&mut self, kind: impl Into<String>, name: impl Into<String>) {
        self.segments.push((kind.into(), name.into()));
    }

    /// Concatenates `child` below this address.
    #[must_use]
    pub fn join(&self, child: &Self) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(child.segments.iter().cloned());
        Self { segments }
    }

    /// All segments, outermost first.
    #[must_use]
    pub fn segments(&self) -> &[(String, String)] {
        &self.segments
    }

    /// The innermost segment.
    #[must_use]
    pub fn last(&self) -> Option<(&str, &str)> {
        self.segments
            .last()
            .map(|(kind, name)| (kind.as_str(), name.as_str()))
    }

    /// Address of the enclosing node; the root is its own parent.
    #[must_use]
    pub fn parent(&self) -> Self {
        let mut segments = self.segments.clone();
        segments.pop();
        Self { segments }
    }

    /// Whether this is the root node.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// DMR list form: `[{"subsystem":"datasources"},{"data-source":"X"}]`.
    #[must_use]
    pub fn to_model(&self) -> Value {
        Value::Array(
            self.segments
                .iter()
                .map(|(kind, name)| {
                    let mut pair = Map::new();
                    pair.insert(kind.clone(), Value::String(name.clone()));
                    Value::Object(pair)
                })
                .collect(),
        )
    }
}

impl fmt::Display for Address {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return formatter.write_str("/");
        }
        for (kind, name) in &self.segments {
            write!(formatter, "/{kind}={name}")?;
        }
        Ok(())
    }
}
