use anyhow::{anyhow, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "identity_service=info,info";

/// Install the JSON fmt subscriber, filtered by `RUST_LOG`, and announce
/// `service_name` once it is active.
///
/// Fails if a global subscriber is already set.
pub fn init_tracing(service_name: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .json()
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {e}"))?;

    info!(service = service_name, "Tracing initialized");
    Ok(())
}
