//! Structured logging setup.

use galleria_error::{ConfigError, GalleriaError, GalleriaResult};
use tracing_subscriber::{
    EnvFilter,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `log_level`. With `json_logs` the output
/// is one JSON object per line, otherwise a human-readable format with
/// targets and source locations.
pub fn init_logging(log_level: &str, json_logs: bool) -> GalleriaResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .map_err(|e| {
            GalleriaError::from(ConfigError::new(format!(
                "Invalid log level '{}': {}",
                log_level, e
            )))
        })?;

    let fmt_layer = if json_logs {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| {
            GalleriaError::from(ConfigError::new(format!(
                "Failed to install tracing subscriber: {}",
                e
            )))
        })
}
