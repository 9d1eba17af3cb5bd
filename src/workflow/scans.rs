//! Resource scan listing

use super::Session;
use crate::model::ScanHandle;
use crate::ops::collect_all;
use anyhow::Result;

/// Fetch every resource scan of the account, in the order the service returns them
pub async fn list_all_scans(session: &Session<'_>) -> Result<Vec<ScanHandle>> {
    let api = session.api;
    let reporter = session.reporter;

    reporter.start("Listing resource scans");
    let scans = collect_all(
        move |token| api.list_scans(token),
        |count| reporter.update(&format!("Listing resource scans ({} so far)", count)),
    )
    .await;

    match scans {
        Ok(scans) => {
            reporter.finish(&format!("Found {} resource scans", scans.len()));
            tracing::info!("Listed {} resource scans", scans.len());
            Ok(scans)
        }
        Err(e) => {
            reporter.fail("Listing resource scans failed");
            Err(e)
        }
    }
}
