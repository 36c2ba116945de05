//! Structured logging

use tracing_subscriber::EnvFilter;

use crate::{config::Config, error::Error, error::Result};

/// Install the global subscriber
///
/// `RUST_LOG` takes precedence over `service.log_level`. Output is JSON unless
/// `service.log_format` is `pretty`.
pub fn init_tracing(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.service.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = match config.service.log_format.as_str() {
        "pretty" => builder.pretty().try_init(),
        _ => builder.json().with_current_span(true).try_init(),
    };
    installed.map_err(|e| Error::Internal(format!("failed to install tracing subscriber: {e}")))?;

    tracing::info!(
        service = %config.service.name,
        environment = %config.service.environment,
        "Tracing initialized"
    );
    Ok(())
}
