//! Structured logging setup.
//!
//! Provides setup for observability using the `tracing` crate with:
//! - Plain text or JSON output on stderr
//! - Log level from `RUST_LOG` or the configured level

use tracing_subscriber::{
    filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Registry,
};

/// Log levels accepted by [`init_tracing`].
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Initialize tracing with the given level and output format.
///
/// `RUST_LOG` takes precedence over `level` when set. Calling this twice
/// is harmless; the second subscriber is ignored.
pub fn init_tracing(level: &str, json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let result = if json {
        let json_layer = fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_file(true)
            .with_line_number(true);

        Registry::default().with(env_filter).with(json_layer).try_init()
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true);

        Registry::default().with(env_filter).with(fmt_layer).try_init()
    };

    if result.is_ok() {
        tracing::debug!("Tracing initialized: level={}, json={}", level, json);
    }
}
