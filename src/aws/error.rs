//! Error rendering for AWS API calls

use aws_sdk_cloudformation::error::{DisplayErrorContext, ProvideErrorMetadata};
use thiserror::Error;

/// Maximum length of an error detail shown to the operator
const MAX_DETAIL_LENGTH: usize = 300;

/// A failed CloudFormation call.
///
/// `message` is the service's own message, without request ids or other metadata; `detail`
/// is the flattened source chain shown to the operator.
#[derive(Debug, Error)]
#[error("{operation} failed: {detail}")]
pub struct ServiceError {
    pub operation: &'static str,
    pub message: Option<String>,
    pub detail: String,
}

impl ServiceError {
    /// Error whose detail is exactly the service message
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            operation,
            detail: message.clone(),
            message: Some(message),
        }
    }
}

/// Map an SDK error into an `anyhow::Error` carrying the full service message.
///
/// The SDK's own `Display` only says "service error"; the useful part lives in the source
/// chain, which `DisplayErrorContext` flattens.
pub fn sdk_error<E>(operation: &'static str, err: E) -> anyhow::Error
where
    E: std::error::Error + ProvideErrorMetadata + Send + Sync + 'static,
{
    let detail = DisplayErrorContext(&err).to_string();
    tracing::error!("{} failed: {}", operation, detail);
    ServiceError {
        operation,
        message: err.message().map(str::to_string),
        detail,
    }
    .into()
}

/// CreateGeneratedTemplate rejects resource lists above the per-template ceiling with a
/// validation message naming both `Resources` and the limit. Only the service message is
/// inspected; request ids in the metadata may contain the same digits.
pub fn is_resource_limit_error(error: &anyhow::Error) -> bool {
    error
        .chain()
        .filter_map(|e| e.downcast_ref::<ServiceError>())
        .filter_map(|e| e.message.as_deref())
        .any(|message| message.contains("Resources") && message.contains("500"))
}

/// Format an AWS API error for display
pub fn format_aws_error(error: &anyhow::Error) -> String {
    let error_str = format!("{:#}", error);

    if error_str.contains("ExpiredToken") || error_str.contains("expired token") {
        return "AWS credentials have expired. Refresh your session and try again.".to_string();
    }
    if error_str.contains("no credentials") || error_str.contains("NoCredentials") {
        return "No AWS credentials found. Configure a profile or export AWS_ACCESS_KEY_ID."
            .to_string();
    }
    if error_str.contains("AccessDenied") || error_str.contains("not authorized") {
        return format!(
            "Permission denied. Check your IAM permissions for CloudFormation.\n  {}",
            truncate(&error_str)
        );
    }
    if error_str.contains("Throttling") || error_str.contains("Rate exceeded") {
        return "Request throttled by AWS. Please try again later.".to_string();
    }

    truncate(&error_str)
}

fn truncate(text: &str) -> String {
    if text.chars().count() <= MAX_DETAIL_LENGTH {
        return text.to_string();
    }
    let head: String = text.chars().take(MAX_DETAIL_LENGTH).collect();
    format!("{}...", head)
}
