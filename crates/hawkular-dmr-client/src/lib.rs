//! Client-side model of the JBoss/WildFly management API (DMR).
//!
//! The wire client itself is hidden behind [`ModelControllerClient`]. This
//! crate provides what sits on top of it:
//!
//! - [`Address`] parsing and rendering
//! - [`OperationBuilder`] and [`CompositeBuilder`] for requests
//! - [`OperationResult`] outcome checks and process-state headers
//! - [`DeploymentClient`] for application content
//! - [`ModuleInstaller`] for static modules such as JDBC drivers

mod address;
mod client;
pub mod deployment;
mod error;
pub mod modules;
mod operation;
mod result;

pub use address::Address;
pub use client::{ModelControllerClient, execute_checked};
pub use deployment::{DeployOptions, DeploymentClient};
pub use error::DmrError;
pub use modules::{ModuleError, ModuleInstaller, ModuleSpec};
pub use operation::{CompositeBuilder, OperationBuilder, OperationRequest, names};
pub use result::{OperationResult, ProcessState};

/// Tracing target for management-client events.
pub(crate) const DMR_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dmr");
