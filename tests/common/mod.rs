//! In-memory capabilities shared by the workflow tests

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use cfngen::aws::error::ServiceError;
use cfngen::aws::CloudFormationApi;
use cfngen::interact::{Prompter, Reporter};
use cfngen::model::{
    CreateTemplateRequest, ResourceEntry, ScanHandle, ScanStatus, ScannedResource,
    TemplateFormat, TemplateHandle, TemplateStatus,
};
use cfngen::ops::PaginatedResult;
use cfngen::workflow::Session;
use std::collections::{BTreeMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

pub const SCAN_ID: &str = "arn:aws:cloudformation:us-east-1:123456789012:resourceScan/scan-1";
pub const TEMPLATE_ID: &str =
    "arn:aws:cloudformation:us-east-1:123456789012:generatedtemplate/tmpl-1";

/// Scripted CloudFormation recording every call it receives
#[derive(Default)]
pub struct FakeCloudFormation {
    pub scan_statuses: Mutex<VecDeque<ScanStatus>>,
    pub scans: Vec<ScanHandle>,
    pub resource_pages: Vec<Vec<ScannedResource>>,
    pub template_statuses: Mutex<VecDeque<TemplateStatus>>,
    pub create_error: Option<String>,
    /// Metadata appended to the rendered create error, like the SDK's request id
    pub create_error_metadata: Option<String>,
    pub template_body: String,
    pub calls: Mutex<Vec<String>>,
    pub create_requests: Mutex<Vec<CreateTemplateRequest>>,
    pub fetch_formats: Mutex<Vec<TemplateFormat>>,
}

impl FakeCloudFormation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scan_statuses(self, statuses: &[ScanStatus]) -> Self {
        *self.scan_statuses.lock().unwrap() = statuses.iter().cloned().collect();
        self
    }

    pub fn with_scans(mut self, scans: Vec<ScanHandle>) -> Self {
        self.scans = scans;
        self
    }

    pub fn with_resource_pages(mut self, pages: Vec<Vec<ScannedResource>>) -> Self {
        self.resource_pages = pages;
        self
    }

    pub fn with_template_statuses(self, statuses: &[TemplateStatus]) -> Self {
        *self.template_statuses.lock().unwrap() = statuses.iter().cloned().collect();
        self
    }

    pub fn with_template_body(mut self, body: &str) -> Self {
        self.template_body = body.to_string();
        self
    }

    pub fn with_create_error(mut self, message: &str) -> Self {
        self.create_error = Some(message.to_string());
        self
    }

    pub fn with_create_error_metadata(mut self, metadata: &str) -> Self {
        self.create_error_metadata = Some(metadata.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fetch_formats(&self) -> Vec<TemplateFormat> {
        self.fetch_formats.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == call).count()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }
}

fn page<T: Clone>(pages: &[Vec<T>], token: Option<String>) -> PaginatedResult<T> {
    let index: usize = token.and_then(|t| t.parse().ok()).unwrap_or(0);
    let items = pages.get(index).cloned().unwrap_or_default();
    let next_token = (index + 1 < pages.len()).then(|| (index + 1).to_string());
    PaginatedResult { items, next_token }
}

#[async_trait]
impl CloudFormationApi for FakeCloudFormation {
    async fn start_scan(&self) -> Result<String> {
        self.record("start_scan");
        Ok(SCAN_ID.to_string())
    }

    async fn describe_scan(&self, scan_id: &str) -> Result<ScanHandle> {
        self.record("describe_scan");
        let status = self
            .scan_statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(ScanStatus::Complete);
        Ok(ScanHandle::new(scan_id, status))
    }

    async fn list_scans(&self, next_token: Option<String>) -> Result<PaginatedResult<ScanHandle>> {
        self.record("list_scans");
        let pages: Vec<Vec<ScanHandle>> = self.scans.chunks(2).map(|c| c.to_vec()).collect();
        Ok(page(&pages, next_token))
    }

    async fn list_scan_resources(
        &self,
        _scan_id: &str,
        next_token: Option<String>,
    ) -> Result<PaginatedResult<ScannedResource>> {
        self.record("list_scan_resources");
        Ok(page(&self.resource_pages, next_token))
    }

    async fn create_template(&self, request: &CreateTemplateRequest) -> Result<String> {
        self.record("create_template");
        self.create_requests.lock().unwrap().push(request.clone());
        match &self.create_error {
            Some(message) => {
                let mut error = ServiceError::new("CreateGeneratedTemplate", message.clone());
                if let Some(metadata) = &self.create_error_metadata {
                    error.detail = format!("{} ({})", message, metadata);
                }
                Err(error.into())
            }
            None => Ok(TEMPLATE_ID.to_string()),
        }
    }

    async fn describe_template(&self, template_id: &str) -> Result<TemplateHandle> {
        self.record("describe_template");
        let status = self
            .template_statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(TemplateStatus::Complete);
        Ok(TemplateHandle::new(template_id, status))
    }

    async fn fetch_template_body(
        &self,
        _template_id: &str,
        format: TemplateFormat,
    ) -> Result<String> {
        self.record("fetch_template_body");
        self.fetch_formats.lock().unwrap().push(format);
        Ok(self.template_body.clone())
    }
}

/// Prompter answering from a script
pub struct ScriptedPrompter {
    pub selection: usize,
    /// `None` declines the save
    pub save_to: Option<PathBuf>,
    pub selections_offered: Mutex<Vec<usize>>,
    pub confirmations: Mutex<Vec<PathBuf>>,
}

impl ScriptedPrompter {
    pub fn saving_to(path: &Path) -> Self {
        Self {
            selection: 0,
            save_to: Some(path.to_path_buf()),
            selections_offered: Mutex::new(Vec::new()),
            confirmations: Mutex::new(Vec::new()),
        }
    }

    pub fn declining() -> Self {
        Self {
            selection: 0,
            save_to: None,
            selections_offered: Mutex::new(Vec::new()),
            confirmations: Mutex::new(Vec::new()),
        }
    }

    pub fn selecting(mut self, index: usize) -> Self {
        self.selection = index;
        self
    }
}

impl Prompter for ScriptedPrompter {
    fn select_scan(&self, scans: &[ScanHandle]) -> Result<usize> {
        self.selections_offered.lock().unwrap().push(scans.len());
        Ok(self.selection)
    }

    fn confirm_output(&self, suggested: &Path) -> Result<Option<PathBuf>> {
        self.confirmations
            .lock()
            .unwrap()
            .push(suggested.to_path_buf());
        Ok(self.save_to.clone())
    }
}

/// Reporter keeping every message
#[derive(Default)]
pub struct RecordingReporter {
    messages: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter_map(|m| m.strip_prefix("WARN: ").map(str::to_string))
            .collect()
    }

    pub fn infos(&self) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter_map(|m| m.strip_prefix("INFO: ").map(str::to_string))
            .collect()
    }

    fn push(&self, kind: &str, message: &str) {
        self.messages
            .lock()
            .unwrap()
            .push(format!("{}: {}", kind, message));
    }
}

impl Reporter for RecordingReporter {
    fn start(&self, message: &str) {
        self.push("START", message);
    }

    fn update(&self, message: &str) {
        self.push("UPDATE", message);
    }

    fn finish(&self, message: &str) {
        self.push("FINISH", message);
    }

    fn fail(&self, message: &str) {
        self.push("FAIL", message);
    }

    fn info(&self, message: &str) {
        self.push("INFO", message);
    }

    fn warn(&self, message: &str) {
        self.push("WARN", message);
    }
}

pub fn session<'a>(
    api: &'a FakeCloudFormation,
    prompter: &'a ScriptedPrompter,
    reporter: &'a RecordingReporter,
) -> Session<'a> {
    Session {
        api,
        prompter,
        reporter,
        poll_interval: Duration::from_secs(10),
    }
}

pub fn bucket(name: &str, managed: bool) -> ScannedResource {
    ScannedResource {
        resource_type: "AWS::S3::Bucket".to_string(),
        resource_identifier: BTreeMap::from([("BucketName".to_string(), name.to_string())]),
        managed_by_stack: managed,
    }
}

pub fn buckets(count: usize) -> Vec<ScannedResource> {
    (0..count)
        .map(|i| bucket(&format!("bucket-{}", i), false))
        .collect()
}

pub fn entries(count: usize) -> Vec<ResourceEntry> {
    buckets(count).into_iter().map(ResourceEntry::from).collect()
}

pub fn write_resource_file(path: &Path, count: usize) {
    let json = serde_json::to_string_pretty(&entries(count)).unwrap();
    std::fs::write(path, json).unwrap();
}
