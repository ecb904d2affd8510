//! Tracing subscriber setup for the binary.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{BoardConfig, LogFormat};

/// Default filter directive; `DEBUG` in the environment raises it.
fn default_filter() -> &'static str {
    if std::env::var("DEBUG").is_ok() {
        "taskboard=debug,info"
    } else {
        "taskboard=info,warn"
    }
}

/// Installs the global subscriber, writing to stderr.
///
/// A second call is a no-op, so repeated in-process runs are fine.
pub fn init_tracing(config: &BoardConfig) {
    let filter = config
        .log_filter
        .as_deref()
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .unwrap_or_else(|| EnvFilter::new(default_filter()));

    let registry = tracing_subscriber::registry().with(filter);
    let result = match config.log_format {
        LogFormat::Json => registry.with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr)).try_init(),
        LogFormat::Compact => registry.with(fmt::layer().compact().with_writer(std::io::stderr)).try_init(),
    };
    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
