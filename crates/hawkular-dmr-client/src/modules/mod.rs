//! Installation of static JBoss modules on the local filesystem.
//!
//! A JDBC driver must be present as a module before a `jdbc-driver` resource
//! can reference it. Modules live under `<modules-root>/<name as path>/<slot>`
//! and consist of the resource jar plus a `module.xml` descriptor.

use std::fs;
use std::io;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::DMR_TARGET;

const DEFAULT_SLOT: &str = "main";
const DESCRIPTOR: &str = "module.xml";
const JDBC_DEPENDENCIES: [&str; 2] = ["javax.api", "javax.transaction.api"];

/// What to install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSpec {
    /// Dotted module name, for example `com.mysql`.
    pub name: String,
    /// Module slot.
    pub slot: String,
    /// File name of the resource jar.
    pub resource_name: String,
    /// Names of modules this one depends on.
    pub dependencies: Vec<String>,
}

impl ModuleSpec {
    /// A module carrying a JDBC driver jar with the standard dependencies.
    #[must_use]
    pub fn jdbc_driver(name: impl Into<String>, resource_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slot: DEFAULT_SLOT.to_owned(),
            resource_name: resource_name.into(),
            dependencies: JDBC_DEPENDENCIES.iter().map(|dep| (*dep).to_owned()).collect(),
        }
    }

    fn relative_dir(&self) -> Utf8PathBuf {
        let mut dir: Utf8PathBuf = self.name.split('.').collect();
        dir.push(&self.slot);
        dir
    }

    fn descriptor(&self) -> String {
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str(&format!(
            "<module xmlns=\"urn:jboss:module:1.1\" name=\"{}\">\n",
            self.name
        ));
        xml.push_str("    <resources>\n");
        xml.push_str(&format!(
            "        <resource-root path=\"{}\"/>\n",
            self.resource_name
        ));
        xml.push_str("    </resources>\n");
        if !self.dependencies.is_empty() {
            xml.push_str("    <dependencies>\n");
            for dependency in &self.dependencies {
                xml.push_str(&format!("        <module name=\"{dependency}\"/>\n"));
            }
            xml.push_str("    </dependencies>\n");
        }
        xml.push_str("</module>\n");
        xml
    }
}

/// Errors raised while installing a module.
#[derive(Debug, Clone, Error)]
pub enum ModuleError {
    /// A module, slot, dependency, or jar name contains unsupported characters.
    #[error("invalid module {field} '{value}'")]
    InvalidName {
        /// Which field was rejected.
        field: &'static str,
        /// The rejected value.
        value: String,
    },
    /// A descriptor already exists at the target location.
    #[error("module already exists at '{path}'")]
    AlreadyExists {
        /// The existing module directory.
        path: Utf8PathBuf,
    },
    /// Writing the module failed.
    #[error("failed to write module file '{path}': {source}")]
    Io {
        /// File or directory being written.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: Arc<io::Error>,
    },
}

impl ModuleError {
    fn io(path: &Utf8Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source: Arc::new(source),
        }
    }
}

/// Writes modules below a modules root such as `$JBOSS_HOME/modules`.
#[derive(Debug, Clone)]
pub struct ModuleInstaller {
    modules_root: Utf8PathBuf,
}

impl ModuleInstaller {
    /// Targets `modules_root`.
    #[must_use]
    pub fn new(modules_root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            modules_root: modules_root.into(),
        }
    }

    /// The modules root.
    #[must_use]
    pub fn modules_root(&self) -> &Utf8Path {
        &self.modules_root
    }

    /// Writes `content` and a generated descriptor for `spec`.
    ///
    /// Returns the module directory.
    ///
    /// # Errors
    ///
    /// Fails on invalid names, when the module is already installed, or when
    /// any file cannot be written.
    pub fn install(&self, spec: &ModuleSpec, content: &[u8]) -> Result<Utf8PathBuf, ModuleError> {
        validate_module_name("name", &spec.name)?;
        validate_plain_name("slot", &spec.slot)?;
        validate_plain_name("resource", &spec.resource_name)?;
        for dependency in &spec.dependencies {
            validate_module_name("dependency", dependency)?;
        }

        let dir = self.modules_root.join(spec.relative_dir());
        let descriptor = dir.join(DESCRIPTOR);
        if descriptor.exists() {
            return Err(ModuleError::AlreadyExists { path: dir });
        }

        fs::create_dir_all(&dir).map_err(|source| ModuleError::io(&dir, source))?;
        let jar = dir.join(&spec.resource_name);
        fs::write(&jar, content).map_err(|source| ModuleError::io(&jar, source))?;
        fs::write(&descriptor, spec.descriptor())
            .map_err(|source| ModuleError::io(&descriptor, source))?;

        debug!(
            target: DMR_TARGET,
            module = %spec.name,
            path = %dir,
            bytes = content.len(),
            "installed module"
        );
        Ok(dir)
    }
}

fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.')
}

fn validate_plain_name(field: &'static str, value: &str) -> Result<(), ModuleError> {
    let valid = !value.is_empty()
        && value != "."
        && value != ".."
        && value.chars().all(is_name_char);
    if valid {
        Ok(())
    } else {
        Err(ModuleError::InvalidName {
            field,
            value: value.to_owned(),
        })
    }
}

fn validate_module_name(field: &'static str, value: &str) -> Result<(), ModuleError> {
    let valid = !value.is_empty()
        && value
            .split('.')
            .all(|part| !part.is_empty() && part.chars().all(is_name_char));
    if valid {
        Ok(())
    } else {
        Err(ModuleError::InvalidName {
            field,
            value: value.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests;
