//! Logging initialization.
//!
//! Console output always; optional JSON formatting and daily-rotated file
//! output per [`LoggingConfig`]. Returns the appender guard that must be
//! kept alive for the lifetime of the process when file logging is on.

use crate::config::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    // RUST_LOG wins over the configured level when set.
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let mut guard = None;
    let file_layer = if config.file_enabled {
        let appender =
            tracing_appender::rolling::daily(&config.file_directory, &config.file_prefix);
        let (writer, worker_guard) = tracing_appender::non_blocking(appender);
        guard = Some(worker_guard);
        Some(fmt::layer().with_writer(writer).with_ansi(false))
    } else {
        None
    };

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);
    if config.json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }

    Ok(guard)
}
