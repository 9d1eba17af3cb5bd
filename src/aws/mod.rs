//! AWS API interaction module
//!
//! The workflows depend on the [`CloudFormationApi`] capability only. [`client::CfnClient`]
//! implements it on top of the AWS SDK; tests provide in-memory implementations.
//!
//! # Module Structure
//!
//! - [`client`] - SDK-backed CloudFormation client
//! - [`error`] - Turning SDK errors into operator-facing messages
//!
//! # Example
//!
//! ```ignore
//! use cfngen::aws::{client::CfnClient, CloudFormationApi};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = CfnClient::new("us-east-1").await;
//!     let scan = client.start_scan().await?;
//!     let handle = client.describe_scan(&scan).await?;
//!     println!("{}", handle.status);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;

use crate::model::{
    CreateTemplateRequest, ScanHandle, ScannedResource, TemplateFormat, TemplateHandle,
};
use crate::ops::PaginatedResult;
use anyhow::Result;
use async_trait::async_trait;

/// Remote operations of the CloudFormation IaC generator
#[async_trait]
pub trait CloudFormationApi: Send + Sync {
    /// Start a new resource scan, returning its id
    async fn start_scan(&self) -> Result<String>;

    /// Current state of a resource scan
    async fn describe_scan(&self, scan_id: &str) -> Result<ScanHandle>;

    /// One page of the account's resource scans
    async fn list_scans(&self, next_token: Option<String>) -> Result<PaginatedResult<ScanHandle>>;

    /// One page of the resources discovered by a completed scan
    async fn list_scan_resources(
        &self,
        scan_id: &str,
        next_token: Option<String>,
    ) -> Result<PaginatedResult<ScannedResource>>;

    /// Start generating a template, returning the generated template id
    async fn create_template(&self, request: &CreateTemplateRequest) -> Result<String>;

    /// Current state of a generated template job
    async fn describe_template(&self, template_id: &str) -> Result<TemplateHandle>;

    /// Body of a completed generated template
    async fn fetch_template_body(&self, template_id: &str, format: TemplateFormat)
        -> Result<String>;
}
