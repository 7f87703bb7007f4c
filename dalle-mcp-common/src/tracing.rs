//! Tracing initialization for the DALL-E MCP server.
//!
//! This module provides utilities for initializing the tracing subscriber
//! with environment-based filtering via the `RUST_LOG` environment variable.
//!
//! Output goes to stderr. With the stdio transport, stdout carries the MCP
//! protocol stream and must not receive log lines.
//!
//! # Usage
//!
//! ```no_run
//! use dalle_mcp_common::tracing::init_tracing;
//!
//! fn main() {
//!     init_tracing();
//!     tracing::info!("Application started");
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Controls the log level and filtering. Examples:
//!   - `RUST_LOG=debug` - Enable debug logging for all modules
//!   - `RUST_LOG=dalle_mcp_image=debug` - Enable debug for the image crate
//!   - `RUST_LOG=warn,dalle_mcp_common=debug` - Warn by default, debug for common

use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    prelude::*,
    util::TryInitError,
};

/// Filter from a `RUST_LOG` value, falling back to `default_level` when the
/// value is unset, blank or unparsable.
fn env_filter(rust_log: Option<&str>, default_level: &str) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default_level))
}

/// Build the subscriber used by every init function.
fn subscriber(default_level: &str) -> impl ::tracing::Subscriber + Send + Sync + 'static + use<> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = env_filter(rust_log.as_deref(), default_level);

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry().with(filter).with(fmt_layer)
}

/// Initialize the tracing subscriber with environment-based filtering.
///
/// Defaults to `info` when `RUST_LOG` is not set.
///
/// # Panics
///
/// This function will panic if called more than once, as the global
/// subscriber can only be set once.
pub fn init_tracing() {
    init_tracing_with_default("info");
}

/// Initialize tracing with a custom default level.
///
/// Similar to `init_tracing()`, but allows specifying a default log level
/// when `RUST_LOG` is not set.
///
/// # Example
///
/// ```no_run
/// use dalle_mcp_common::tracing::init_tracing_with_default;
///
/// fn main() {
///     init_tracing_with_default("debug");
/// }
/// ```
pub fn init_tracing_with_default(default_level: &str) {
    subscriber(default_level).init();
}

/// Try to initialize tracing, returning an error if already initialized.
///
/// Unlike `init_tracing()`, this function does not panic if the subscriber
/// is already set.
pub fn try_init_tracing() -> Result<(), TryInitError> {
    subscriber("info").try_init()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_try_init_tracing_does_not_panic() {
        // Succeeds or fails depending on test order, but never panics
        let _ = try_init_tracing();
        assert!(try_init_tracing().is_err(), "Second init must report an error");
    }

    #[test]
    fn test_default_level_used_without_rust_log() {
        for (level, expected) in [
            ("error", LevelFilter::ERROR),
            ("warn", LevelFilter::WARN),
            ("info", LevelFilter::INFO),
            ("debug", LevelFilter::DEBUG),
            ("trace", LevelFilter::TRACE),
        ] {
            assert_eq!(env_filter(None, level).max_level_hint(), Some(expected));
        }
    }

    #[test]
    fn test_rust_log_overrides_default_level() {
        let filter = env_filter(Some("debug"), "warn");
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn test_module_specific_rust_log() {
        let filter = env_filter(Some("warn,dalle_mcp_image=trace"), "info");
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn test_blank_or_invalid_rust_log_falls_back() {
        assert_eq!(env_filter(Some("  "), "warn").max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(
            env_filter(Some("dalle_mcp_image=loud"), "error").max_level_hint(),
            Some(LevelFilter::ERROR)
        );
    }
}
