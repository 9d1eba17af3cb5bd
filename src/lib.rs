//! cfngen
//!
//! Drives the CloudFormation IaC generator: scan existing resources, pick the ones that are
//! not yet managed by a stack, and turn them into a generated template.
//!
//! # Module Structure
//!
//! - [`aws`] - Remote operation client (SDK-backed) and error formatting
//! - [`config`] - Persistent configuration and region resolution
//! - [`model`] - Scan, resource and template types
//! - [`ops`] - Poller, pagination collector and resource filter
//! - [`interact`] - Prompting and progress reporting capabilities
//! - [`workflow`] - The `resources` and `template` orchestrators

pub mod aws;
pub mod config;
pub mod error;
pub mod interact;
pub mod model;
pub mod ops;
pub mod workflow;

pub use error::WorkflowError;

/// CloudFormation refuses to generate a template from more resources than this.
pub const MAX_TEMPLATE_RESOURCES: usize = 500;
