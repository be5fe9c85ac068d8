//! Structured logging for Ariadne.
//!
//! The engine and executor only emit `tracing` events. A host that wants to
//! see them installs a subscriber once at startup with [`init_logging`].
//!
//! # Events
//!
//! | Target | Level | Message | Fields |
//! |--------|-------|---------|--------|
//! | `ariadne_core::engine` | debug | `registered middleware` | `category`, `middleware` |
//! | `ariadne_core::engine` | debug | `duplicate middleware registration ignored` | `category`, `middleware` |
//! | `ariadne_core::middleware` | trace | `invoking middleware` | `index`, `middleware` |
//! | `ariadne_core::pipeline` | debug | `pipeline finished` | `invoked`, `short_circuited` |
//! | `ariadne_core::pipeline` | warn | `pipeline failed` | `invoked`, `code`, `error` |
//!
//! # Example
//!
//! ```rust,ignore
//! use ariadne_telemetry::logging::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development())?;
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use tracing_subscriber::fmt::format::{FmtSpan, Format};
use tracing_subscriber::fmt::{self, FormatEvent, FormatFields};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Whether logging is enabled.
    pub enabled: bool,

    /// Filter directive (e.g., "info", "ariadne_core=trace,warn").
    pub level: String,

    /// Whether to output JSON format.
    pub json_format: bool,

    /// Whether to include span events (new, close).
    pub span_events: bool,

    /// Whether to include file/line info.
    pub file_line_info: bool,

    /// Whether to include thread IDs.
    pub thread_ids: bool,

    /// Whether to include target (module path).
    pub include_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::production()
    }
}

impl LogConfig {
    /// Creates a development configuration with human-readable output.
    #[must_use]
    pub fn development() -> Self {
        Self {
            enabled: true,
            level: "debug".to_string(),
            json_format: false,
            span_events: true,
            file_line_info: true,
            thread_ids: false,
            include_target: true,
        }
    }

    /// Creates a production configuration with JSON output.
    #[must_use]
    pub fn production() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            json_format: true,
            span_events: false,
            file_line_info: false,
            thread_ids: false,
            include_target: true,
        }
    }

    /// Sets the filter directive.
    #[must_use]
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }
}

/// Initializes the logging subsystem.
///
/// # Errors
///
/// Returns `TelemetryError::LoggingInit` if the filter directive is invalid
/// or a global subscriber is already installed.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = create_env_filter(&config.level)?;

    if config.json_format {
        install(fmt::layer().json(), config, filter)
    } else {
        install(fmt::layer().pretty(), config, filter)
    }
}

/// Applies the shared layer options and installs the global subscriber.
fn install<N, L>(
    layer: fmt::Layer<Registry, N, Format<L>>,
    config: &LogConfig,
    filter: EnvFilter,
) -> TelemetryResult<()>
where
    N: for<'w> FormatFields<'w> + Send + Sync + 'static,
    L: Send + Sync + 'static,
    Format<L>: FormatEvent<Registry, N>,
{
    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let layer = layer
        .with_span_events(span_events)
        .with_file(config.file_line_info)
        .with_line_number(config.file_line_info)
        .with_thread_ids(config.thread_ids)
        .with_target(config.include_target)
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(layer)
        .try_init()
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}

/// Creates an env filter from a directive string.
///
/// # Errors
///
/// Returns `TelemetryError::LoggingInit` if the directive is invalid.
pub fn create_env_filter(filter: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(filter)
        .map_err(|e| TelemetryError::LoggingInit(format!("Invalid log level: {e}")))
}

/// Field names used by Ariadne log events.
pub mod fields {
    /// Registry category (`global`, `named`, `server`).
    pub const CATEGORY: &str = "category";

    /// Middleware display name or namespace.
    pub const MIDDLEWARE: &str = "middleware";

    /// Zero-based position of an entry in a chain.
    pub const INDEX: &str = "index";

    /// Number of entries in a composed chain.
    pub const ENTRIES: &str = "entries";

    /// Number of entries invoked during a run.
    pub const INVOKED: &str = "invoked";

    /// Whether a run stopped before the end of the chain.
    pub const SHORT_CIRCUITED: &str = "short_circuited";

    /// Stable error code (`E_...`).
    pub const CODE: &str = "code";

    /// Error field name.
    pub const ERROR: &str = "error";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert!(config.enabled);
        assert!(config.json_format);
        assert_eq!(config.level, "info");
    }

    #[test]
    fn test_development_config() {
        let config = LogConfig::development();
        assert!(!config.json_format);
        assert!(config.span_events);
        assert!(config.file_line_info);
        assert_eq!(config.level, "debug");
    }

    #[test]
    fn test_production_config() {
        let config = LogConfig::production();
        assert!(config.json_format);
        assert!(!config.span_events);
        assert!(!config.file_line_info);
        assert_eq!(config.level, "info");
    }

    #[test]
    fn test_with_level() {
        let config = LogConfig::production().with_level("ariadne_core=trace");
        assert_eq!(config.level, "ariadne_core=trace");
    }

    #[test]
    fn test_create_env_filter() {
        assert!(create_env_filter("info").is_ok());
        assert!(create_env_filter("ariadne_core=trace,warn").is_ok());
        assert!(create_env_filter("ariadne_core=loud").is_err());
    }

    #[test]
    fn test_invalid_level_fails_init() {
        let config = LogConfig::production().with_level("ariadne_core=loud");
        assert!(matches!(
            init_logging(&config),
            Err(TelemetryError::LoggingInit(_))
        ));
    }

    #[test]
    fn test_disabled_logging() {
        let config = LogConfig {
            enabled: false,
            ..Default::default()
        };
        assert!(init_logging(&config).is_ok());
    }

    #[test]
    fn test_field_names() {
        assert_eq!(fields::MIDDLEWARE, "middleware");
        assert_eq!(fields::CODE, "code");
    }
}
