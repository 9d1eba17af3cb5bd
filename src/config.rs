//! Configuration Management
//!
//! Handles persistent configuration storage and region resolution for cfngen.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::ops::DEFAULT_POLL_INTERVAL;

/// Region used when nothing else is configured
pub const DEFAULT_REGION: &str = "us-east-1";

/// Environment variables consulted for the region, in order
pub const REGION_ENV_VARS: &[&str] = &["AWS_REGION", "AWS_DEFAULT_REGION"];

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Last used region
    #[serde(default)]
    pub region: Option<String>,
    /// Seconds between two status polls
    #[serde(default)]
    pub poll_interval_secs: Option<u64>,
}

impl Config {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("cfngen").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };

        // Create parent directory
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        Ok(())
    }

    /// Get effective region (CLI > AWS_REGION > AWS_DEFAULT_REGION > config > default)
    pub fn effective_region(&self, cli: Option<&str>) -> String {
        resolve_region(cli, |name| std::env::var(name).ok(), self.region.as_deref())
    }

    /// Get effective poll interval (CLI > config > default)
    pub fn effective_poll_interval(&self, cli_secs: Option<u64>) -> Duration {
        cli_secs
            .or(self.poll_interval_secs)
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_POLL_INTERVAL)
    }

    /// Set region and save
    pub fn set_region(&mut self, region: &str) -> Result<()> {
        if self.region.as_deref() == Some(region) {
            return Ok(());
        }
        self.region = Some(region.to_string());
        self.save()
    }
}

/// Resolve the region from the CLI flag, the environment and the config file
pub fn resolve_region<F>(cli: Option<&str>, env: F, configured: Option<&str>) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |s: &str| !s.trim().is_empty();

    if let Some(region) = cli.filter(|s| non_empty(s)) {
        return region.to_string();
    }
    for var in REGION_ENV_VARS {
        if let Some(region) = env(var).filter(|s| non_empty(s)) {
            return region;
        }
    }
    configured
        .filter(|s| non_empty(s))
        .map(str::to_string)
        .unwrap_or_else(|| DEFAULT_REGION.to_string())
}
