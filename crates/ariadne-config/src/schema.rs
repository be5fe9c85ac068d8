//! Configuration schema types.
//!
//! This module defines the structure of all configuration sections.

use ariadne_telemetry::LogConfig;
use serde::{Deserialize, Serialize};

/// Engine configuration section.
///
/// # Example
///
/// ```
/// use ariadne_config::EngineConfig;
///
/// let config = EngineConfig {
///     default_method: Some("handle".to_string()),
///     warn_duplicates: true,
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Method appended to namespace references (`"Foo"` → `"Foo.handle"`).
    ///
    /// Required. There is no built-in fallback.
    #[serde(default)]
    pub default_method: Option<String>,

    /// Forward duplicate-registration warnings to the warning sink.
    #[serde(default = "default_true")]
    pub warn_duplicates: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_method: None,
            warn_duplicates: true,
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (e.g., "info", "ariadne_core=trace,warn").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            include_location: false,
        }
    }
}

impl LoggingConfig {
    /// Converts this section into the telemetry crate's [`LogConfig`].
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        let base = match self.format {
            LogFormat::Json => LogConfig::production(),
            LogFormat::Pretty => LogConfig::development(),
        };

        LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            file_line_info: self.include_location,
            ..base
        }
    }
}

/// Declarative middleware registrations.
///
/// Values are kept as raw JSON so that shape errors surface from the engine
/// with the same messages as programmatic registration.
///
/// ```toml
/// [kernel]
/// global = ["App/Middleware/BodyParser"]
/// server = ["App/Middleware/Cors"]
///
/// [kernel.named]
/// auth = "App/Middleware/Auth"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct KernelConfig {
    /// Global middleware namespaces, in order.
    #[serde(default)]
    pub global: Option<serde_json::Value>,

    /// Alias → namespace map of named middleware.
    #[serde(default)]
    pub named: Option<serde_json::Value>,

    /// Server middleware namespaces, in order.
    #[serde(default)]
    pub server: Option<serde_json::Value>,
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_defaults() {
        let config = EngineConfig::default();
        assert!(config.default_method.is_none());
        assert!(config.warn_duplicates);
    }

    #[test]
    fn test_engine_rejects_unknown_fields() {
        let result: Result<EngineConfig, _> = toml::from_str("default_methd = \"handle\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_log_format_lowercase() {
        let config: LoggingConfig = toml::from_str("format = \"pretty\"").unwrap();
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.level, "info");
    }

    #[test]
    fn test_to_log_config() {
        let config = LoggingConfig {
            enabled: true,
            level: "ariadne_core=trace".to_string(),
            format: LogFormat::Pretty,
            include_location: false,
        };

        let log = config.to_log_config();
        assert!(!log.json_format);
        assert!(!log.file_line_info);
        assert_eq!(log.level, "ariadne_core=trace");
    }

    #[test]
    fn test_kernel_keeps_raw_values() {
        let kernel: KernelConfig = toml::from_str(
            r#"
            global = "App/Middleware/Cors"
            [named]
            auth = "App/Middleware/Auth"
            "#,
        )
        .unwrap();

        assert_eq!(kernel.global, Some(serde_json::json!("App/Middleware/Cors")));
        assert_eq!(
            kernel.named,
            Some(serde_json::json!({ "auth": "App/Middleware/Auth" }))
        );
        assert!(kernel.server.is_none());
    }
}
