//! Logging Infrastructure
//!
//! Console output always; a daily rotating file is added when the log
//! directory exists. `RUST_LOG` overrides the configured level.

use std::path::Path;

use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the logger (console only, `info`)
pub fn init_logger() {
    init_logger_with_file(None, false, None);
}

/// Initialize the logger with optional JSON format and file output
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logger_with_file(log_level: Option<&str>, json: bool, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer = if json {
        fmt::layer().json().with_target(true).boxed()
    } else {
        fmt::layer().with_target(false).boxed()
    };

    let file_layer = log_dir
        .map(Path::new)
        .filter(|dir| dir.exists())
        .map(|dir| {
            let appender = tracing_appender::rolling::daily(dir, "booking-server");
            fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(appender)
                .boxed()
        });

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();
}
