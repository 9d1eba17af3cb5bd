//! Workflow orchestrators
//!
//! - [`resources`] - Scan the account and save the resources not yet managed by a stack
//! - [`template`] - Turn a resource list (or a stack) into a generated template
//! - [`scans`] - List existing resource scans
//!
//! Each workflow is strictly sequential and writes its output only after every remote step
//! succeeded and the operator confirmed the destination.

pub mod resources;
pub mod scans;
pub mod template;

pub use resources::{run_resources, ResourcesOptions, ResourcesSaved};
pub use scans::list_all_scans;
pub use template::{run_template, TemplateOptions, TemplateSaved};

use crate::aws::CloudFormationApi;
use crate::interact::{Prompter, Reporter};
use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;

/// Capabilities a workflow runs with
#[derive(Clone, Copy)]
pub struct Session<'a> {
    pub api: &'a dyn CloudFormationApi,
    pub prompter: &'a dyn Prompter,
    pub reporter: &'a dyn Reporter,
    pub poll_interval: Duration,
}

/// How a workflow ended, short of an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// Output was written
    Saved(T),
    /// The operator declined to save; nothing was written
    Aborted,
}

impl<T> Outcome<T> {
    pub fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted)
    }
}

/// Write `contents` to `path` through a sibling temporary file, so an interrupted write
/// never leaves a truncated output behind.
pub(crate) fn write_output(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let file_name = path
        .file_name()
        .with_context(|| format!("{} is not a file path", path.display()))?;
    let mut partial_name = std::ffi::OsString::from(".");
    partial_name.push(file_name);
    partial_name.push(".partial");
    let partial = path.with_file_name(partial_name);

    discard_on_error(&partial, std::fs::write(&partial, contents))
        .with_context(|| format!("Failed to write {}", partial.display()))?;
    discard_on_error(&partial, std::fs::rename(&partial, path))
        .with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}

/// Remove the temporary file when a step of the write failed
fn discard_on_error<T>(partial: &Path, result: std::io::Result<T>) -> std::io::Result<T> {
    if result.is_err() {
        let _ = std::fs::remove_file(partial);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_output_leaves_no_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.json");

        write_output(&path, "[]").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
        let names: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("out.json")]);
    }

    #[test]
    fn test_failed_write_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let partial = dir.path().join(".out.json.partial");
        std::fs::write(&partial, "[{").unwrap();

        let result: std::io::Result<()> =
            discard_on_error(&partial, Err(std::io::Error::other("No space left on device")));

        assert!(result.is_err());
        assert!(!partial.exists());
    }

    #[test]
    fn test_successful_step_keeps_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let partial = dir.path().join(".out.json.partial");
        std::fs::write(&partial, "[]").unwrap();

        discard_on_error(&partial, Ok(())).unwrap();

        assert!(partial.exists());
    }

    #[test]
    fn test_write_output_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.json");
        std::fs::write(&path, "old").unwrap();

        write_output(&path, "new").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }
}
