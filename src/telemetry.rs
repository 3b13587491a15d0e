use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::config::ObservabilityConfig;

/// Initialize structured logging. RUST_LOG wins over the configured level.
pub fn init_telemetry(config: &ObservabilityConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if config.json_logs {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(filter)
            .init();
    }

    tracing::info!("PitchDesk telemetry initialized");
    Ok(())
}

/// Generate a correlation ID for linking related operations
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}
