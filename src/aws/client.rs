//! CloudFormation Client
//!
//! SDK-backed implementation of [`CloudFormationApi`].

use super::error::sdk_error;
use super::CloudFormationApi;
use crate::model::{
    CreateTemplateRequest, RetentionPolicy, ScanHandle, ScanStatus, ScannedResource,
    TemplateFormat, TemplateHandle, TemplateProgress, TemplateSource, TemplateStatus,
};
use crate::ops::PaginatedResult;
use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_cloudformation::primitives::DateTime as AwsDateTime;
use aws_sdk_cloudformation::types::{
    GeneratedTemplateDeletionPolicy, GeneratedTemplateUpdateReplacePolicy, ResourceDefinition,
    TemplateConfiguration, TemplateFormat as AwsTemplateFormat,
};
use aws_sdk_cloudformation::Client;
use chrono::{DateTime, Utc};

/// CloudFormation client bound to one region
#[derive(Clone)]
pub struct CfnClient {
    client: Client,
    region: String,
}

impl CfnClient {
    /// Create a client using the default credential chain
    pub async fn new(region: &str) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;

        tracing::info!("CloudFormation client ready in {}", region);

        Self {
            client: Client::new(&config),
            region: region.to_string(),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}

#[async_trait]
impl CloudFormationApi for CfnClient {
    async fn start_scan(&self) -> Result<String> {
        tracing::debug!("StartResourceScan");

        let output = self
            .client
            .start_resource_scan()
            .send()
            .await
            .map_err(|e| sdk_error("StartResourceScan", e))?;

        output
            .resource_scan_id()
            .map(str::to_string)
            .context("StartResourceScan returned no scan id")
    }

    async fn describe_scan(&self, scan_id: &str) -> Result<ScanHandle> {
        tracing::debug!("DescribeResourceScan {}", scan_id);

        let output = self
            .client
            .describe_resource_scan()
            .resource_scan_id(scan_id)
            .send()
            .await
            .map_err(|e| sdk_error("DescribeResourceScan", e))?;

        Ok(ScanHandle {
            id: output.resource_scan_id().unwrap_or(scan_id).to_string(),
            status: output
                .status()
                .map(|s| ScanStatus::from_api(s.as_str()))
                .unwrap_or(ScanStatus::Pending),
            start_time: output.start_time().and_then(to_chrono),
            status_reason: output.status_reason().map(str::to_string),
            percentage_completed: output.percentage_completed(),
        })
    }

    async fn list_scans(&self, next_token: Option<String>) -> Result<PaginatedResult<ScanHandle>> {
        tracing::debug!("ListResourceScans token={:?}", next_token);

        let output = self
            .client
            .list_resource_scans()
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| sdk_error("ListResourceScans", e))?;

        let items = output
            .resource_scan_summaries()
            .iter()
            .filter_map(|summary| {
                let id = summary.resource_scan_id()?;
                Some(ScanHandle {
                    id: id.to_string(),
                    status: summary
                        .status()
                        .map(|s| ScanStatus::from_api(s.as_str()))
                        .unwrap_or(ScanStatus::Pending),
                    start_time: summary.start_time().and_then(to_chrono),
                    status_reason: summary.status_reason().map(str::to_string),
                    percentage_completed: summary.percentage_completed(),
                })
            })
            .collect();

        Ok(PaginatedResult {
            items,
            next_token: output.next_token().map(str::to_string),
        })
    }

    async fn list_scan_resources(
        &self,
        scan_id: &str,
        next_token: Option<String>,
    ) -> Result<PaginatedResult<ScannedResource>> {
        tracing::debug!("ListResourceScanResources {} token={:?}", scan_id, next_token);

        let output = self
            .client
            .list_resource_scan_resources()
            .resource_scan_id(scan_id)
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| sdk_error("ListResourceScanResources", e))?;

        let items = output
            .resources()
            .iter()
            .map(|r| ScannedResource {
                resource_type: r.resource_type().unwrap_or_default().to_string(),
                resource_identifier: r
                    .resource_identifier()
                    .map(|ids| ids.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
                    .unwrap_or_default(),
                managed_by_stack: r.managed_by_stack().unwrap_or(false),
            })
            .collect();

        Ok(PaginatedResult {
            items,
            next_token: output.next_token().map(str::to_string),
        })
    }

    async fn create_template(&self, request: &CreateTemplateRequest) -> Result<String> {
        tracing::debug!("CreateGeneratedTemplate {}", request.name);

        let configuration = TemplateConfiguration::builder()
            .deletion_policy(match request.deletion_policy {
                RetentionPolicy::Delete => GeneratedTemplateDeletionPolicy::Delete,
                RetentionPolicy::Retain => GeneratedTemplateDeletionPolicy::Retain,
            })
            .update_replace_policy(match request.update_replace_policy {
                RetentionPolicy::Delete => GeneratedTemplateUpdateReplacePolicy::Delete,
                RetentionPolicy::Retain => GeneratedTemplateUpdateReplacePolicy::Retain,
            })
            .build();

        let mut call = self
            .client
            .create_generated_template()
            .generated_template_name(&request.name)
            .template_configuration(configuration);

        call = match &request.source {
            TemplateSource::Stack(stack_name) => call.stack_name(stack_name),
            TemplateSource::Resources(entries) => {
                let definitions = entries
                    .iter()
                    .map(|entry| {
                        Ok(ResourceDefinition::builder()
                            .resource_type(&entry.resource_type)
                            .set_resource_identifier(Some(
                                entry.resource_identifier.clone().into_iter().collect(),
                            ))
                            .build())
                    })
                    .collect::<Result<Vec<_>>>()?;
                call.set_resources(Some(definitions))
            }
        };

        let output = call
            .send()
            .await
            .map_err(|e| sdk_error("CreateGeneratedTemplate", e))?;

        output
            .generated_template_id()
            .map(str::to_string)
            .context("CreateGeneratedTemplate returned no template id")
    }

    async fn describe_template(&self, template_id: &str) -> Result<TemplateHandle> {
        tracing::debug!("DescribeGeneratedTemplate {}", template_id);

        let output = self
            .client
            .describe_generated_template()
            .generated_template_name(template_id)
            .send()
            .await
            .map_err(|e| sdk_error("DescribeGeneratedTemplate", e))?;

        Ok(TemplateHandle {
            id: template_id.to_string(),
            status: output
                .status()
                .map(|s| TemplateStatus::from_api(s.as_str()))
                .unwrap_or(TemplateStatus::Pending),
            status_reason: output.status_reason().map(str::to_string),
            progress: output.progress().map(|p| TemplateProgress {
                succeeded: p.resources_succeeded().unwrap_or(0),
                failed: p.resources_failed().unwrap_or(0),
                in_progress: p.resources_processing().unwrap_or(0),
                pending: p.resources_pending().unwrap_or(0),
            }),
        })
    }

    async fn fetch_template_body(
        &self,
        template_id: &str,
        format: TemplateFormat,
    ) -> Result<String> {
        tracing::debug!("GetGeneratedTemplate {} format={}", template_id, format.as_str());

        let output = self
            .client
            .get_generated_template()
            .generated_template_name(template_id)
            .format(match format {
                TemplateFormat::Json => AwsTemplateFormat::Json,
                TemplateFormat::Yaml => AwsTemplateFormat::Yaml,
            })
            .send()
            .await
            .map_err(|e| sdk_error("GetGeneratedTemplate", e))?;

        output
            .template_body()
            .map(str::to_string)
            .context("GetGeneratedTemplate returned no template body")
    }
}

fn to_chrono(time: &AwsDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(time.secs(), time.subsec_nanos())
}
