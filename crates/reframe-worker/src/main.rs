//! Reframing worker binary.

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use reframe_worker::{metrics, ReframeRunner, WorkerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("reframe_worker=info".parse()?)
        .add_directive("reframe_core=info".parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting reframe-worker");

    let config = WorkerConfig::from_env();
    info!("Worker config: {:?}", config);

    let metrics_handle = match metrics::init_metrics() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Metrics disabled: {}", e);
            None
        }
    };
    let metrics_out = config.metrics_out.clone();

    let runner = ReframeRunner::new(config)
        .await
        .context("failed to prepare reframing run")?;

    if let Err(e) = runner.run().await {
        error!(run_id = %runner.run_id(), "Run failed: {}", e);
        return Err(e).context("reframing run failed");
    }

    if let (Some(handle), Some(path)) = (metrics_handle, metrics_out) {
        metrics::write_snapshot(&handle, &path)
            .await
            .context("failed to write metrics snapshot")?;
    }

    info!("Worker shutdown complete");
    Ok(())
}
