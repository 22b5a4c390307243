use std::env;
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Stderr logging filtered by `TRACING_LEVEL` (default `warn`), plus a file
/// log when `LOG_FILE_PATH` is set. Stdout is left to the result lines.
pub fn init_logger() -> Option<WorkerGuard> {
    let filter = env::var("TRACING_LEVEL").unwrap_or_else(|_| "warn".to_string());
    let filter_layer = EnvFilter::new(filter);

    let (file_layer, guard) = match env::var("LOG_FILE_PATH") {
        Ok(log_file_path) => {
            let file_appender = tracing_appender::rolling::never("./", log_file_path);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer().with_writer(non_blocking).with_ansi(false);
            (Some(layer), Some(guard))
        }
        Err(_) => (None, None),
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_file(false)
                .without_time()
                .with_ansi(true),
        )
        .with(file_layer)
        .with(filter_layer)
        .init();

    debug!("Tracing is configured for stderr and file logging.");

    guard
}
