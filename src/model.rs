//! Scan, resource and template types
//!
//! These mirror the pieces of the CloudFormation IaC generator API that cfngen cares about,
//! decoupled from the SDK types so workflows can run against any [`CloudFormationApi`].
//!
//! [`CloudFormationApi`]: crate::aws::CloudFormationApi

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Where a long-running operation stands, from the poller's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Not finished yet, poll again
    Running,
    /// Finished successfully, the handle is usable
    Complete,
    /// Finished unsuccessfully, fatal
    Failed,
}

/// Something the poller can wait on
pub trait OperationStatus {
    /// Classify the current status
    fn phase(&self) -> Phase;

    /// Raw status label, as reported by the service
    fn status_label(&self) -> String;

    /// Optional human-readable progress detail (percentages, counters)
    fn progress_note(&self) -> Option<String> {
        None
    }

    /// Reason reported by the service for the current status
    fn reason(&self) -> Option<&str> {
        None
    }
}

// =============================================================================
// Resource scans
// =============================================================================

/// Status of a resource scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanStatus {
    Pending,
    InProgress,
    Complete,
    Failed,
    Expired,
    Unknown(String),
}

impl ScanStatus {
    pub fn from_api(s: &str) -> Self {
        match s {
            "PENDING" => Self::Pending,
            "IN_PROGRESS" => Self::InProgress,
            "COMPLETE" => Self::Complete,
            "FAILED" => Self::Failed,
            "EXPIRED" => Self::Expired,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Complete => "COMPLETE",
            Self::Failed => "FAILED",
            Self::Expired => "EXPIRED",
            Self::Unknown(s) => s,
        }
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resource scan as last observed
#[derive(Debug, Clone, PartialEq)]
pub struct ScanHandle {
    pub id: String,
    pub status: ScanStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub status_reason: Option<String>,
    pub percentage_completed: Option<f64>,
}

impl ScanHandle {
    pub fn new(id: impl Into<String>, status: ScanStatus) -> Self {
        Self {
            id: id.into(),
            status,
            start_time: None,
            status_reason: None,
            percentage_completed: None,
        }
    }

    /// One-line description used in selection lists
    pub fn summary_line(&self) -> String {
        let started = self
            .start_time
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "-".to_string());
        format!("{}  {:<11}  {}", started, self.status.as_str(), self.id)
    }
}

impl OperationStatus for ScanHandle {
    fn phase(&self) -> Phase {
        match self.status {
            ScanStatus::Complete => Phase::Complete,
            ScanStatus::Failed | ScanStatus::Expired => Phase::Failed,
            _ => Phase::Running,
        }
    }

    fn status_label(&self) -> String {
        self.status.to_string()
    }

    fn progress_note(&self) -> Option<String> {
        self.percentage_completed.map(|p| format!("{:.0}%", p))
    }

    fn reason(&self) -> Option<&str> {
        self.status_reason.as_deref()
    }
}

/// A resource discovered by a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedResource {
    pub resource_type: String,
    pub resource_identifier: BTreeMap<String, String>,
    /// Already managed by a CloudFormation stack
    pub managed_by_stack: bool,
}

/// A resource as persisted in the resources file and sent to template generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceEntry {
    pub resource_type: String,
    pub resource_identifier: BTreeMap<String, String>,
}

impl From<ScannedResource> for ResourceEntry {
    fn from(resource: ScannedResource) -> Self {
        Self {
            resource_type: resource.resource_type,
            resource_identifier: resource.resource_identifier,
        }
    }
}

impl From<ResourceEntry> for ScannedResource {
    fn from(entry: ResourceEntry) -> Self {
        Self {
            resource_type: entry.resource_type,
            resource_identifier: entry.resource_identifier,
            managed_by_stack: false,
        }
    }
}

// =============================================================================
// Generated templates
// =============================================================================

/// Status of a generated template job
///
/// The service distinguishes create/update/delete variants of pending and in-progress; cfngen
/// only needs to know that the job is still running. There is no expired state for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateStatus {
    Pending,
    InProgress,
    Complete,
    Failed,
    Unknown(String),
}

impl TemplateStatus {
    pub fn from_api(s: &str) -> Self {
        match s {
            "CREATE_PENDING" | "UPDATE_PENDING" | "DELETE_PENDING" | "PENDING" => Self::Pending,
            "CREATE_IN_PROGRESS" | "UPDATE_IN_PROGRESS" | "DELETE_IN_PROGRESS" | "IN_PROGRESS" => {
                Self::InProgress
            }
            "COMPLETE" => Self::Complete,
            "FAILED" => Self::Failed,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Complete => "COMPLETE",
            Self::Failed => "FAILED",
            Self::Unknown(s) => s,
        }
    }
}

impl fmt::Display for TemplateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-resource counters reported while a template is being generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TemplateProgress {
    pub succeeded: i32,
    pub failed: i32,
    pub in_progress: i32,
    pub pending: i32,
}

impl TemplateProgress {
    pub fn total(&self) -> i32 {
        self.succeeded + self.failed + self.in_progress + self.pending
    }
}

/// A generated template job as last observed
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateHandle {
    pub id: String,
    pub status: TemplateStatus,
    pub status_reason: Option<String>,
    pub progress: Option<TemplateProgress>,
}

impl TemplateHandle {
    pub fn new(id: impl Into<String>, status: TemplateStatus) -> Self {
        Self {
            id: id.into(),
            status,
            status_reason: None,
            progress: None,
        }
    }
}

impl OperationStatus for TemplateHandle {
    fn phase(&self) -> Phase {
        match self.status {
            TemplateStatus::Complete => Phase::Complete,
            TemplateStatus::Failed => Phase::Failed,
            _ => Phase::Running,
        }
    }

    fn status_label(&self) -> String {
        self.status.to_string()
    }

    fn progress_note(&self) -> Option<String> {
        self.progress
            .filter(|p| p.total() > 0)
            .map(|p| format!("{}/{} resources", p.succeeded + p.failed, p.total()))
    }

    fn reason(&self) -> Option<&str> {
        self.status_reason.as_deref()
    }
}

/// What a generated template is built from
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateSource {
    /// An explicit resource list, usually read from a resources file
    Resources(Vec<ResourceEntry>),
    /// All resources of an existing stack
    Stack(String),
}

/// Policy applied to generated resources on stack deletion or logical-ID replacement.
///
/// Templates are always requested with `Delete`; `Retain` mirrors the service enum so the
/// client mapping stays total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionPolicy {
    Delete,
    Retain,
}

/// Parameters of a CreateGeneratedTemplate call
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTemplateRequest {
    pub name: String,
    pub source: TemplateSource,
    pub deletion_policy: RetentionPolicy,
    pub update_replace_policy: RetentionPolicy,
}

/// Serialization format requested for the template body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TemplateFormat {
    #[default]
    Json,
    Yaml,
}

impl TemplateFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Yaml => "YAML",
        }
    }
}
