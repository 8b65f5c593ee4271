//! Observability infrastructure for Carpool.
//!
//! Structured logging with consistent spans. This module provides
//! initialization helpers and span constructors used across components.

use std::sync::Once;
use tracing::Span;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Log output format.
#[derive(Debug, Clone, Copy, Default)]
pub enum LogFormat {
    /// JSON structured logs (for production).
    Json,
    /// Pretty-printed logs (for development).
    #[default]
    Pretty,
}

/// Initializes the logging subsystem.
///
/// Call once at application startup. Safe to call multiple times;
/// subsequent calls are no-ops.
///
/// # Environment Variables
///
/// - `RUST_LOG`: Controls log levels (e.g., `info`, `carpool_core=debug`)
///
/// # Example
///
/// ```rust
/// use carpool_core::observability::{LogFormat, init_logging};
///
/// init_logging(LogFormat::Pretty);
/// ```
pub fn init_logging(format: LogFormat) {
    INIT.call_once(|| {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        match format {
            LogFormat::Json => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().json())
                    .init();
            }
            LogFormat::Pretty => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer().pretty())
                    .init();
            }
        }
    });
}

/// Creates a span for ride lifecycle operations with standard fields.
///
/// # Example
///
/// ```rust
/// use carpool_core::observability::ride_span;
///
/// let span = ride_span("accept_as_driver", "driver@example.com");
/// let _guard = span.enter();
/// // ... do lifecycle operation
/// ```
#[must_use]
pub fn ride_span(operation: &str, actor: &str) -> Span {
    tracing::info_span!(
        "ride",
        op = operation,
        actor = actor,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_succeeds() {
        // Should not panic (uses Once internally)
        init_logging(LogFormat::Pretty);
        init_logging(LogFormat::Pretty); // Second call should be no-op
    }

    #[test]
    fn test_span_helper_creates_span() {
        let span = ride_span("create_request", "a@x.com");
        let _guard = span.enter();
        tracing::info!("test message in span");
    }
}
