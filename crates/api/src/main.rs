//! Cardiac Risk Predictor - Main Entry Point

use anyhow::Context;
use api::{init_logging, run_server, AppConfig, AppState};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    init_logging(&config.log_level)?;

    info!("=== Cardiac Risk Predictor v{} ===", env!("CARGO_PKG_VERSION"));

    let state = match AppState::from_config(&config) {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to load model artifacts: {}", e);
            return Err(e).context("startup aborted");
        }
    };

    let state = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => state.with_metrics(handle),
        Err(e) => {
            warn!("Metrics disabled: {}", e);
            state
        }
    };

    run_server(&config.bind_addr, Arc::new(state)).await?;

    Ok(())
}
