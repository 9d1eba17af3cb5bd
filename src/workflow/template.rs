//! Template workflow
//!
//! Create a generated template from a resource list file or an existing stack, wait for it,
//! fetch the body and save it verbatim.

use super::{write_output, Outcome, Session};
use crate::aws::error::is_resource_limit_error;
use crate::error::WorkflowError;
use crate::model::{
    CreateTemplateRequest, ResourceEntry, RetentionPolicy, TemplateFormat, TemplateSource,
};
use crate::ops::wait_until_terminal;
use crate::MAX_TEMPLATE_RESOURCES;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Default resource list read by the template workflow
pub const DEFAULT_INPUT_FILE: &str = "resources.json";

/// Default destination of the template body
pub const DEFAULT_TEMPLATE_FILE: &str = "template.json";

#[derive(Debug, Clone)]
pub struct TemplateOptions {
    /// Resource list file, ignored when `from_stack` is set
    pub input: PathBuf,
    /// Suggested destination
    pub output: PathBuf,
    /// Seed the template from an existing stack instead of a file
    pub from_stack: Option<String>,
    pub format: TemplateFormat,
}

/// Summary of a saved template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSaved {
    pub template_name: String,
    pub template_id: String,
    pub path: PathBuf,
    pub bytes: usize,
}

pub async fn run_template(
    session: &Session<'_>,
    options: &TemplateOptions,
) -> Result<Outcome<TemplateSaved>> {
    let source = match &options.from_stack {
        Some(stack) => TemplateSource::Stack(stack.clone()),
        None => TemplateSource::Resources(load_resource_list(&options.input)?),
    };

    let request = CreateTemplateRequest {
        name: generated_template_name(Utc::now()),
        source,
        deletion_policy: RetentionPolicy::Delete,
        update_replace_policy: RetentionPolicy::Delete,
    };
    let template_id = create_template(session, &request).await?;

    let api = session.api;
    let id = template_id.as_str();
    wait_until_terminal(
        "Generated template",
        id,
        move || api.describe_template(id),
        session.poll_interval,
        session.reporter,
    )
    .await?;

    session.reporter.start("Fetching template body");
    let body = match api.fetch_template_body(id, options.format).await {
        Ok(body) => body,
        Err(e) => {
            session.reporter.fail("Fetching template body failed");
            return Err(e.context(format!("Failed to fetch generated template {}", id)));
        }
    };
    session
        .reporter
        .finish(&format!("Fetched template ({} bytes)", body.len()));

    let Some(path) = session.prompter.confirm_output(&options.output)? else {
        tracing::info!("Save declined, nothing written");
        session.reporter.info("Aborted, nothing was saved.");
        return Ok(Outcome::Aborted);
    };

    write_output(&path, &body)?;
    session
        .reporter
        .info(&format!("Saved template {} to {}", request.name, path.display()));

    Ok(Outcome::Saved(TemplateSaved {
        template_name: request.name,
        template_id,
        path,
        bytes: body.len(),
    }))
}

/// Read and check a resource list before anything is sent to CloudFormation
pub fn load_resource_list(path: &Path) -> Result<Vec<ResourceEntry>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read resource list {}", path.display()))?;
    let entries: Vec<ResourceEntry> = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a valid resource list", path.display()))?;

    if entries.is_empty() {
        return Err(WorkflowError::Precondition(format!(
            "{} contains no resources",
            path.display()
        ))
        .into());
    }
    if entries.len() > MAX_TEMPLATE_RESOURCES {
        return Err(WorkflowError::Precondition(format!(
            "{} lists {} resources; a generated template holds at most {}. \
             Split the file and run `cfngen template` for each part.",
            path.display(),
            entries.len(),
            MAX_TEMPLATE_RESOURCES
        ))
        .into());
    }

    tracing::info!("Loaded {} resources from {}", entries.len(), path.display());
    Ok(entries)
}

/// Unique generated template name, e.g. `cfngen-20240131-154502-1a2b3c4d`
pub fn generated_template_name(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("cfngen-{}-{}", now.format("%Y%m%d-%H%M%S"), &suffix[..8])
}

async fn create_template(session: &Session<'_>, request: &CreateTemplateRequest) -> Result<String> {
    let described = match &request.source {
        TemplateSource::Stack(stack) => format!("stack {}", stack),
        TemplateSource::Resources(entries) => format!("{} resources", entries.len()),
    };

    session
        .reporter
        .start(&format!("Creating template {} from {}", request.name, described));

    match session.api.create_template(request).await {
        Ok(id) => {
            tracing::info!("Created generated template {} ({})", request.name, id);
            session
                .reporter
                .finish(&format!("Template {} requested", request.name));
            Ok(id)
        }
        Err(e) if is_resource_limit_error(&e) => {
            tracing::error!("Template {} rejected for size: {:#}", request.name, e);
            session.reporter.fail("Too many resources for one template");
            Err(WorkflowError::ResourceLimitExceeded {
                limit: MAX_TEMPLATE_RESOURCES,
            }
            .into())
        }
        Err(e) => {
            session.reporter.fail("Template creation failed");
            Err(e.context(format!("Failed to create generated template {}", request.name)))
        }
    }
}
