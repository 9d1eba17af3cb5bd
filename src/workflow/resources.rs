//! Resources workflow
//!
//! Obtain a completed resource scan (a fresh one, or one picked from the account's existing
//! scans), download everything it found, drop what stacks already manage and save the rest as
//! a JSON array.

use super::{list_all_scans, write_output, Outcome, Session};
use crate::error::WorkflowError;
use crate::model::{ScanHandle, ScanStatus, ScannedResource};
use crate::ops::{collect_all, filter_unmanaged, wait_until_terminal};
use crate::MAX_TEMPLATE_RESOURCES;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Default destination of the resource list
pub const DEFAULT_RESOURCES_FILE: &str = "resources.json";

#[derive(Debug, Clone)]
pub struct ResourcesOptions {
    /// Start a new scan
    pub new_scan: bool,
    /// Pick an existing scan
    pub from_scan: bool,
    /// Suggested destination
    pub output: PathBuf,
}

/// Summary of a saved resource list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcesSaved {
    pub scan_id: String,
    pub path: PathBuf,
    pub saved: usize,
    pub filtered_out: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanSource {
    New,
    Existing,
}

impl ScanSource {
    fn from_flags(new_scan: bool, from_scan: bool) -> Result<Self, WorkflowError> {
        match (new_scan, from_scan) {
            (true, false) => Ok(Self::New),
            (false, true) => Ok(Self::Existing),
            (true, true) => Err(WorkflowError::Usage(
                "--new-scan and --from-scan cannot be used together".to_string(),
            )),
            (false, false) => Err(WorkflowError::Usage(
                "Choose a scan source: --new-scan to start a scan, or --from-scan to pick an existing one"
                    .to_string(),
            )),
        }
    }
}

pub async fn run_resources(
    session: &Session<'_>,
    options: &ResourcesOptions,
) -> Result<Outcome<ResourcesSaved>> {
    let source = ScanSource::from_flags(options.new_scan, options.from_scan)?;
    tracing::info!("Resources workflow started ({:?} scan)", source);

    let scan = match source {
        ScanSource::New => start_new_scan(session).await?,
        ScanSource::Existing => select_existing_scan(session).await?,
    };

    let resources = download_resources(session, &scan.id).await?;
    let outcome = filter_unmanaged(resources);
    tracing::info!(
        "Scan {}: {} resources, {} managed by stacks",
        scan.id,
        outcome.total,
        outcome.removed
    );
    session.reporter.info(&format!(
        "{} resources found, {} already managed by a stack",
        outcome.total, outcome.removed
    ));

    if outcome.resources.len() > MAX_TEMPLATE_RESOURCES {
        tracing::warn!(
            "{} resources exceed the template limit of {}",
            outcome.resources.len(),
            MAX_TEMPLATE_RESOURCES
        );
        session.reporter.warn(&format!(
            "{} resources is more than the {} CloudFormation accepts in one generated template. \
             Split the file before running `cfngen template`.",
            outcome.resources.len(),
            MAX_TEMPLATE_RESOURCES
        ));
    }

    let Some(path) = session.prompter.confirm_output(&options.output)? else {
        tracing::info!("Save declined, nothing written");
        session.reporter.info("Aborted, nothing was saved.");
        return Ok(Outcome::Aborted);
    };

    let json = serde_json::to_string_pretty(&outcome.resources)
        .context("Failed to serialize resource list")?;
    write_output(&path, &json)?;

    session.reporter.info(&format!(
        "Saved {} resources to {} (filtered {} managed by stacks)",
        outcome.resources.len(),
        path.display(),
        outcome.removed
    ));

    Ok(Outcome::Saved(ResourcesSaved {
        scan_id: scan.id,
        path,
        saved: outcome.resources.len(),
        filtered_out: outcome.removed,
    }))
}

async fn start_new_scan(session: &Session<'_>) -> Result<ScanHandle> {
    let api = session.api;

    session.reporter.start("Starting resource scan");
    let scan_id = match api.start_scan().await {
        Ok(id) => id,
        Err(e) => {
            session.reporter.fail("Could not start resource scan");
            return Err(e.context("Failed to start resource scan"));
        }
    };
    tracing::info!("Started resource scan {}", scan_id);
    session
        .reporter
        .info(&format!("Resource scan {} started", scan_id));

    let id = scan_id.as_str();
    wait_until_terminal(
        "Resource scan",
        id,
        move || api.describe_scan(id),
        session.poll_interval,
        session.reporter,
    )
    .await
}

/// Existing scans are used as they are: one that has not completed is rejected, not waited on.
async fn select_existing_scan(session: &Session<'_>) -> Result<ScanHandle> {
    let scans = list_all_scans(session).await?;
    if scans.is_empty() {
        return Err(WorkflowError::Precondition(
            "No resource scans found. Start one with `cfngen resources --new-scan`.".to_string(),
        )
        .into());
    }

    let index = session.prompter.select_scan(&scans)?;
    let scan = scans
        .into_iter()
        .nth(index)
        .with_context(|| format!("Scan selection {} is out of range", index))?;
    tracing::info!("Selected scan {} ({})", scan.id, scan.status);

    if scan.status != ScanStatus::Complete {
        return Err(WorkflowError::Precondition(format!(
            "Resource scan {} is {}; only COMPLETE scans can be used",
            scan.id, scan.status
        ))
        .into());
    }

    Ok(scan)
}

async fn download_resources(session: &Session<'_>, scan_id: &str) -> Result<Vec<ScannedResource>> {
    let api = session.api;
    let reporter = session.reporter;

    reporter.start(&format!("Downloading resources of scan {}", scan_id));
    let result = collect_all(
        move |token| api.list_scan_resources(scan_id, token),
        |count| reporter.update(&format!("Downloaded {} resources", count)),
    )
    .await;

    match result {
        Ok(resources) => {
            reporter.finish(&format!("Downloaded {} resources", resources.len()));
            Ok(resources)
        }
        Err(e) => {
            reporter.fail("Downloading resources failed");
            Err(e.context(format!("Failed to list resources of scan {}", scan_id)))
        }
    }
}
