//! Observability for Ariadne middleware engines.
//!
//! - **Logging**: structured JSON or pretty output for the `tracing` events
//!   the engine and executor emit.
//! - **Warning sinks**: destinations for duplicate-registration warnings.
//! - **Metrics**: Prometheus-format counters and histograms via the
//!   `metrics` crate.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────── ariadne-core ───────────────────────────┐
//! │  Engine ── tracing events ──┐      Engine ── duplicate warning ──┐  │
//! │  Pipeline ─ tracing events ─┤      Instrumented handler ──────┐  │  │
//! └─────────────────────────────┼─────────────────────────────────┼──┼──┘
//!                               ▼                                 ▼  ▼
//!                        init_logging                     metrics   WarningSink
//!                     (json / pretty fmt)                (Prometheus) (tracing / collect)
//! ```
//!
//! # Example
//!
//! ```
//! use ariadne_core::{middleware_fn, Engine};
//! use ariadne_telemetry::{instrument, MetricsWarningSink, TracingWarningSink};
//!
//! # tokio_test::block_on(async {
//! let mut engine: Engine<Vec<String>> = Engine::builder()
//!     .default_method("handle")
//!     .warning_sink(MetricsWarningSink::wrapping(TracingWarningSink))
//!     .build()
//!     .unwrap();
//!
//! engine.use_middleware([instrument(middleware_fn(
//!     "trail",
//!     |ctx: &mut Vec<String>, next, _params| {
//!         Box::pin(async move {
//!             ctx.push("trail".to_string());
//!             next.run(ctx).await
//!         })
//!     },
//! ))]);
//!
//! let trail = engine.compose_server().params(Vec::new()).run().await.unwrap();
//! assert_eq!(trail, vec!["trail"]);
//! # });
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod logging;
pub mod metrics;
pub mod sink;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig};
pub use metrics::{
    init_metrics, instrument, record_duplicate, render_metrics, Instrumented, MetricsConfig,
    MetricsWarningSink,
};
pub use sink::{CollectingWarningSink, TracingWarningSink};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Combined telemetry configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetryConfig {
    /// Logging configuration.
    pub logging: LogConfig,

    /// Metrics configuration.
    pub metrics: MetricsConfig,
}

impl TelemetryConfig {
    /// Development preset: pretty debug logs, metrics on.
    #[must_use]
    pub fn development() -> Self {
        Self {
            logging: LogConfig::development(),
            metrics: MetricsConfig::default(),
        }
    }

    /// Production preset: JSON info logs, metrics on.
    #[must_use]
    pub fn production() -> Self {
        Self {
            logging: LogConfig::production(),
            metrics: MetricsConfig::default(),
        }
    }
}

/// Initializes logging, then metrics.
///
/// # Errors
///
/// Returns `TelemetryError` if either subsystem fails to initialize.
pub fn init_telemetry(config: &TelemetryConfig) -> TelemetryResult<()> {
    init_logging(&config.logging)?;
    init_metrics(&config.metrics)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert!(!TelemetryConfig::development().logging.json_format);
        assert!(TelemetryConfig::production().logging.json_format);
        assert_eq!(TelemetryConfig::default(), TelemetryConfig::production());
    }

    #[test]
    fn test_disabled_telemetry() {
        let mut config = TelemetryConfig::default();
        config.logging.enabled = false;
        config.metrics.enabled = false;
        assert!(init_telemetry(&config).is_ok());
    }
}
