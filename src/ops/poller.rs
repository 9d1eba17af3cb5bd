//! Long-running operation poller
//!
//! Both resource scans and template generation are started with one call and then observed
//! with a describe call until they settle. The loop here is shared by both.

use crate::error::WorkflowError;
use crate::interact::Reporter;
use crate::model::{OperationStatus, Phase};
use anyhow::Result;
use std::future::Future;
use std::time::Duration;

/// Interval between two describe calls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Describe `operation_id` until it reaches a terminal status.
///
/// Returns the last observed handle once it is complete. A failure status is turned into
/// [`WorkflowError::OperationFailed`]; describe errors are propagated as-is. There is no
/// timeout: the loop sleeps `poll_interval` after every non-terminal observation and never
/// after a terminal one.
pub async fn wait_until_terminal<H, F, Fut>(
    kind: &'static str,
    operation_id: &str,
    mut describe: F,
    poll_interval: Duration,
    reporter: &dyn Reporter,
) -> Result<H>
where
    H: OperationStatus,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<H>>,
{
    reporter.start(&format!("{} {}: waiting", kind, operation_id));
    let mut polls: u32 = 0;

    loop {
        let handle = match describe().await {
            Ok(handle) => handle,
            Err(e) => {
                reporter.fail(&format!("{} {}: status unavailable", kind, operation_id));
                return Err(e);
            }
        };
        polls += 1;

        let status = handle.status_label();
        tracing::debug!("{} {} poll #{}: {}", kind, operation_id, polls, status);

        match handle.phase() {
            Phase::Complete => {
                tracing::info!("{} {} complete after {} polls", kind, operation_id, polls);
                reporter.finish(&format!("{} {} complete", kind, operation_id));
                return Ok(handle);
            }
            Phase::Failed => {
                tracing::error!(
                    "{} {} ended with {}: {}",
                    kind,
                    operation_id,
                    status,
                    handle.reason().unwrap_or("no reason given")
                );
                reporter.fail(&format!("{} {} {}", kind, operation_id, status));
                return Err(WorkflowError::OperationFailed {
                    kind,
                    id: operation_id.to_string(),
                    status,
                    reason: handle.reason().map(str::to_string),
                }
                .into());
            }
            Phase::Running => {
                let message = match handle.progress_note() {
                    Some(note) => format!("{} {}: {} ({})", kind, operation_id, status, note),
                    None => format!("{} {}: {}", kind, operation_id, status),
                };
                reporter.update(&message);
                tokio::time::sleep(poll_interval).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ScanHandle, ScanStatus, TemplateHandle, TemplateStatus};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tokio::time::Instant;

    struct SilentReporter;

    impl Reporter for SilentReporter {
        fn start(&self, _: &str) {}
        fn update(&self, _: &str) {}
        fn finish(&self, _: &str) {}
        fn fail(&self, _: &str) {}
        fn info(&self, _: &str) {}
        fn warn(&self, _: &str) {}
    }

    fn scripted_scans(statuses: &[&str]) -> Mutex<VecDeque<ScanHandle>> {
        Mutex::new(
            statuses
                .iter()
                .map(|s| ScanHandle::new("scan-1", ScanStatus::from_api(s)))
                .collect(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleeps_once_per_running_status() {
        let script = scripted_scans(&["IN_PROGRESS", "IN_PROGRESS", "COMPLETE", "FAILED"]);
        let interval = Duration::from_secs(10);
        let started = Instant::now();

        let handle = wait_until_terminal(
            "Resource scan",
            "scan-1",
            || {
                let next = script.lock().unwrap().pop_front().unwrap();
                async move { Ok(next) }
            },
            interval,
            &SilentReporter,
        )
        .await
        .unwrap();

        assert_eq!(handle.status, ScanStatus::Complete);
        assert_eq!(started.elapsed(), interval * 2);
        // The trailing FAILED was never described
        assert_eq!(script.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_scan_is_fatal() {
        let script = scripted_scans(&["PENDING", "EXPIRED"]);
        let started = Instant::now();

        let err = wait_until_terminal(
            "Resource scan",
            "scan-1",
            || {
                let next = script.lock().unwrap().pop_front().unwrap();
                async move { Ok(next) }
            },
            Duration::from_secs(10),
            &SilentReporter,
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<WorkflowError>(),
            Some(WorkflowError::OperationFailed { status, .. }) if status == "EXPIRED"
        ));
        assert_eq!(started.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_template_failure_carries_reason() {
        let mut failed = TemplateHandle::new("tmpl", TemplateStatus::Failed);
        failed.status_reason = Some("Resource limit".to_string());
        let script = Mutex::new(VecDeque::from([
            TemplateHandle::new("tmpl", TemplateStatus::InProgress),
            failed,
        ]));

        let err = wait_until_terminal(
            "Generated template",
            "tmpl",
            || {
                let next = script.lock().unwrap().pop_front().unwrap();
                async move { Ok(next) }
            },
            Duration::from_secs(1),
            &SilentReporter,
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("Resource limit"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_describe_error_stops_polling() {
        let started = Instant::now();
        let result: Result<ScanHandle> = wait_until_terminal(
            "Resource scan",
            "scan-1",
            || async { Err(anyhow::anyhow!("throttled")) },
            Duration::from_secs(10),
            &SilentReporter,
        )
        .await;

        tokio_test::assert_err!(&result);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }
}
