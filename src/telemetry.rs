use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::routes::metrics::describe_metrics;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("Invalid metrics listen address: {0}")]
    Address(String),

    #[error("Failed to install Prometheus exporter: {0}")]
    Install(#[from] BuildError),

    #[error("Failed to write metrics file: {0}")]
    Io(#[from] std::io::Error),
}

/// JSON logs filtered by `RUST_LOG`, defaulting to `info`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .try_init();
}

/// Install the global recorder with its own scrape endpoint, for binaries
/// that do not serve the API router.
pub fn install_metrics_listener(addr: &str) -> Result<SocketAddr, MetricsError> {
    let addr: SocketAddr = addr
        .parse()
        .map_err(|_| MetricsError::Address(addr.to_string()))?;

    PrometheusBuilder::new().with_http_listener(addr).install()?;
    describe_metrics();
    Ok(addr)
}

/// Write the current exposition to `path`, replacing it atomically so a
/// collector never reads a partial file.
pub fn write_metrics_file(handle: &PrometheusHandle, path: &Path) -> Result<(), MetricsError> {
    let staging = path.with_extension("prom.tmp");
    std::fs::write(&staging, handle.render())?;
    std::fs::rename(&staging, path)?;
    Ok(())
}
