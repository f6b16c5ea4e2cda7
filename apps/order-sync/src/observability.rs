//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

use crate::config::{LogFormat, LoggingConfig};

/// Directives used when `RUST_LOG` is unset.
fn default_directives(level: &str) -> String {
    format!("order_sync={level},sqlx=warn,reqwest=warn,hyper=warn")
}

/// Build the filter: `RUST_LOG` wins, otherwise the configured level.
fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(default_directives(&config.level))
            .unwrap_or_else(|_| EnvFilter::new("order_sync=info"))
    })
}

/// Install the global tracing subscriber.
///
/// Call once, before anything logs.
pub fn init_tracing(config: &LoggingConfig) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_target(true);

    match config.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Compact => builder.compact().init(),
    }
}
