//! Prometheus exporter for worker runs.

use crate::error::{WorkerError, WorkerResult};
use metrics::counter;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::path::Path;
use tracing::info;

/// Install the Prometheus recorder for this process.
pub fn init_metrics() -> WorkerResult<PrometheusHandle> {
    PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| WorkerError::metrics_error(e.to_string()))
}

/// Write the current metrics snapshot in Prometheus text format.
pub async fn write_snapshot(handle: &PrometheusHandle, path: &Path) -> WorkerResult<()> {
    tokio::fs::write(path, handle.render()).await?;
    info!(path = %path.display(), "Wrote metrics snapshot");
    Ok(())
}

/// Metric names as constants for consistency.
pub mod names {
    pub const RUNS_TOTAL: &str = "reframe_runs_total";
}

/// Record a finished run.
pub fn record_run(mode: &str, success: bool) {
    let labels = [
        ("mode", mode.to_string()),
        ("status", if success { "ok" } else { "failed" }.to_string()),
    ];
    counter!(names::RUNS_TOTAL, &labels).increment(1);
}
