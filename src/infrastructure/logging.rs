use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub const LOG_FILE_NAME: &str = "focusboard.log";
const DEFAULT_FILTER: &str = "focusboard=info";

/// Installs the global subscriber: human-readable lines on stderr and the same
/// events appended to `<logs_dir>/focusboard.log`.
///
/// Stdout is left untouched for the host protocol. Keep the returned guard
/// alive for the process lifetime or buffered file output is lost.
pub fn init_tracing(logs_dir: &Path) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::never(logs_dir, LOG_FILE_NAME);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(file_writer));
    if let Err(error) = registry.try_init() {
        eprintln!("tracing subscriber already installed: {error}");
    }

    guard
}
