pub mod config;
pub mod error;

pub use config::{
    CacheConfig, Config, ConfigValidationError, ForecastConfig, ServiceConfig, ValidationResult,
};
pub use error::ConfigError;

use anyhow::Result;

/// Initialize tracing for the command-line front end.
///
/// Libraries in this workspace only emit events; installing a subscriber is
/// left to the binary.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::debug!("yr core initialized");
    Ok(())
}
