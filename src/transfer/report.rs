use crate::transfer::results::RunReport;
use chrono::Utc;
use log::{error, info};
use std::path::Path;

/// Persists one newline-delimited file per result set, named
/// `<operation>_<set>_<YYYY_MM_DD_HH_MM>.log`. Write failures are logged and
/// never abort the run; the report is a convenience, not part of the outcome.
pub(crate) async fn write_report_files(report_dir: &Path, operation: &str, report: &RunReport) {
    if let Err(e) = tokio::fs::create_dir_all(report_dir).await {
        error!("Error creating report directory {}: {}", report_dir.display(), e);
        return;
    }
    let stamp = Utc::now().format("%Y_%m_%d_%H_%M");

    let sets = [
        ("succeeded", &report.succeeded),
        ("failed", &report.failed),
        ("corrupted", &report.corrupted),
    ];

    for (label, entries) in sets {
        let path = report_dir.join(format!("{operation}_{label}_{stamp}.log"));
        let mut content = entries.join("\n");
        content.push('\n');
        match tokio::fs::write(&path, content).await {
            Ok(()) => info!("Saved report: {} ({} entries)", path.display(), entries.len()),
            Err(e) => error!("Error writing report file {}: {}", path.display(), e),
        }
    }
}
