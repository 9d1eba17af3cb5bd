//! Resource filter
//!
//! Drops resources that already belong to a stack and strips the ownership flag from the rest.

use crate::model::{ResourceEntry, ScannedResource};

/// Outcome of [`filter_unmanaged`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOutcome {
    /// Surviving resources, in input order
    pub resources: Vec<ResourceEntry>,
    /// Number of resources before filtering
    pub total: usize,
    /// Number of stack-managed resources removed
    pub removed: usize,
}

pub fn filter_unmanaged(resources: Vec<ScannedResource>) -> FilterOutcome {
    let total = resources.len();
    let kept: Vec<ResourceEntry> = resources
        .into_iter()
        .filter(|r| !r.managed_by_stack)
        .map(ResourceEntry::from)
        .collect();

    FilterOutcome {
        removed: total - kept.len(),
        total,
        resources: kept,
    }
}
