//! Interactive prompts

use crate::model::ScanHandle;
use anyhow::{Context, Result};
use dialoguer::{Confirm, Input, Select};
use std::path::{Path, PathBuf};

/// Questions a workflow may ask the operator
pub trait Prompter: Send + Sync {
    /// Pick one scan out of `scans` (never empty). Returns its index.
    fn select_scan(&self, scans: &[ScanHandle]) -> Result<usize>;

    /// Ask where to save the output, starting from `suggested`.
    /// Returns `None` when the operator declines to save.
    fn confirm_output(&self, suggested: &Path) -> Result<Option<PathBuf>>;
}

/// Prompter backed by dialoguer on the controlling terminal
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn select_scan(&self, scans: &[ScanHandle]) -> Result<usize> {
        let labels: Vec<String> = scans.iter().map(ScanHandle::summary_line).collect();

        Select::new()
            .with_prompt("Select a resource scan")
            .items(&labels)
            .default(0)
            .interact()
            .context("Scan selection was interrupted")
    }

    fn confirm_output(&self, suggested: &Path) -> Result<Option<PathBuf>> {
        let path: String = Input::new()
            .with_prompt("Save to")
            .default(suggested.display().to_string())
            .interact_text()
            .context("Output path prompt was interrupted")?;

        let path = PathBuf::from(path.trim());
        let prompt = if path.exists() {
            format!("{} already exists. Overwrite?", path.display())
        } else {
            format!("Write {}?", path.display())
        };

        let confirmed = Confirm::new()
            .with_prompt(prompt)
            .default(true)
            .interact()
            .context("Confirmation prompt was interrupted")?;

        Ok(confirmed.then_some(path))
    }
}
