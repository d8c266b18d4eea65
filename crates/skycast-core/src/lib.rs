pub mod config;
pub mod error;

pub use config::{
    ApiKey, Config, DisplayConfig, FallbackLocation, GeocodingConfig, LocationConfig, Units,
    ValidationResult, WeatherConfig,
};
pub use error::{ConfigError, NetworkError, ReqwestErrorExt};

use anyhow::Result;

/// Initialize logging for the process.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` is used. Output goes to
/// stderr so rendered reports on stdout stay clean.
pub fn init(default_filter: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    tracing::debug!("Skycast core initialized");
    Ok(())
}
