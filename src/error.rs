//! Fatal workflow conditions
//!
//! Remote call failures travel as plain `anyhow` errors; the conditions below are the ones the
//! workflows detect themselves and that callers may want to tell apart.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Conflicting or missing flags, detected before any remote call
    #[error("{0}")]
    Usage(String),

    /// Input that cannot be worked with (empty lists, unfinished scans, ...)
    #[error("{0}")]
    Precondition(String),

    /// A polled operation reached a failure status
    #[error("{kind} {id} ended with status {status}{}", reason_suffix(.reason))]
    OperationFailed {
        kind: &'static str,
        id: String,
        status: String,
        reason: Option<String>,
    },

    /// CloudFormation rejected the template because it holds too many resources
    #[error(
        "Template creation failed: more than {limit} resources were requested. \
         CloudFormation generates at most {limit} resources per template; \
         split the resource list into smaller files and run `cfngen template` for each."
    )]
    ResourceLimitExceeded { limit: usize },
}

fn reason_suffix(reason: &Option<String>) -> String {
    match reason {
        Some(r) if !r.is_empty() => format!(": {}", r),
        _ => String::new(),
    }
}
