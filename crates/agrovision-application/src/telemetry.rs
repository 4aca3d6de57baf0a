//! Tracing subscriber setup for front ends embedding the application.

use std::path::Path;

use agrovision_infrastructure::AgroPaths;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const LOG_FILE_PREFIX: &str = "agrovision";

/// Installs the global subscriber: stdout always, plus a daily-rotated file
/// under `log_dir` when one is given.
///
/// `RUST_LOG` overrides the default `info` filter. Keep the returned guard
/// alive for the lifetime of the program or buffered file output is lost.
/// Calling this twice leaves the first subscriber in place.
pub fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match log_dir.map(prepare_log_dir) {
        Some(Some(dir)) => {
            let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .compact();
            (Some(layer), Some(guard))
        }
        _ => (None, None),
    };

    let result = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stdout)
                .compact(),
        )
        .with(file_layer)
        .try_init();

    if let Err(e) = result {
        eprintln!("Tracing already initialised: {e}");
    }
    guard
}

/// [`init_tracing`] with file output under the standard logs directory.
///
/// Falls back to stdout only when no data directory can be resolved.
pub fn init_tracing_for(paths: &AgroPaths) -> Option<WorkerGuard> {
    match paths.logs_dir() {
        Ok(dir) => init_tracing(Some(&dir)),
        Err(e) => {
            eprintln!("Failed to resolve log directory: {e}");
            init_tracing(None)
        }
    }
}

fn prepare_log_dir(dir: &Path) -> Option<&Path> {
    match std::fs::create_dir_all(dir) {
        Ok(()) => Some(dir),
        Err(e) => {
            eprintln!("Failed to create log directory {}: {e}", dir.display());
            None
        }
    }
}
