//! Logging setup for binaries and test harnesses embedding the engine.

use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

use crate::error::{MigrateError, Result};

/// Parse a verbosity name; unknown names fall back to `info`.
pub fn parse_level(verbosity: &str) -> Level {
    match verbosity.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Install a global `tracing` subscriber.
///
/// `format` is `"json"` for structured output, anything else for text.
/// `RUST_LOG`, when set, overrides `verbosity`.
pub fn init_logging(verbosity: &str, format: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(parse_level(verbosity).to_string().to_lowercase()));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false);

    let installed = if format.eq_ignore_ascii_case("json") {
        subscriber.json().try_init()
    } else {
        subscriber.try_init()
    };

    installed.map_err(|e| MigrateError::Config(format!("failed to install logger: {}", e)))
}
