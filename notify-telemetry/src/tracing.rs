//! Tracing subscriber setup for the notification services.
//!
//! Both binaries call [`init_tracing`] once at startup and hold on to the returned
//! [`LogFlusher`] for the lifetime of the process so buffered log lines are flushed
//! on shutdown.

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_log::LogTracer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Errors that can occur while installing the global tracing subscriber.
#[derive(Debug, Error)]
pub enum TracingError {
    /// The `log` crate bridge could not be installed.
    #[error("failed to install log tracer: {0}")]
    LogTracer(#[from] tracing_log::log::SetLoggerError),

    /// A global subscriber was already installed.
    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}

/// Guard that flushes buffered log output when dropped.
///
/// Keep this alive for the duration of the process, typically by binding it to an
/// underscore-prefixed local in `main`.
#[must_use = "dropping the flusher stops log output"]
pub struct LogFlusher {
    _guard: WorkerGuard,
}

/// Initializes the global tracing subscriber for a service binary.
///
/// Installs a non-blocking stdout writer, an env-filter honoring `RUST_LOG` (with an
/// `info` default scoped to the given service), and a bridge for `log`-based crates.
pub fn init_tracing(service_name: &str) -> Result<LogFlusher, TracingError> {
    LogTracer::init()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("info,{}=info", service_name.replace('-', "_"))));

    let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());

    let fmt_layer = fmt::layer().with_target(true).with_writer(writer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(LogFlusher { _guard: guard })
}
