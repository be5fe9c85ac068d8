//! Main configuration types.
//!
//! This module provides the top-level [`AriadneConfig`] struct and its builder.

use ariadne_core::{Engine, EngineBuilder, Locator, DEFAULT_METHOD};
use ariadne_telemetry::TracingWarningSink;
use serde::{Deserialize, Serialize};

use crate::{ConfigError, EngineConfig, KernelConfig, LogFormat, LoggingConfig};

/// Complete Ariadne configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use ariadne_config::AriadneConfig;
///
/// let config = AriadneConfig::production();
/// assert_eq!(config.engine.default_method.as_deref(), Some("handle"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct AriadneConfig {
    /// Engine configuration.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Declarative middleware registrations.
    #[serde(default)]
    pub kernel: KernelConfig,
}

impl AriadneConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> AriadneConfigBuilder {
        AriadneConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// - `MissingField` if `engine.default_method` is not set.
    /// - `InvalidValue` if `engine.default_method` is blank or
    ///   `logging.level` is not a valid filter directive.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.engine.default_method.as_deref() {
            None => return Err(ConfigError::missing_field("engine.default_method")),
            Some(method) if method.trim().is_empty() => {
                return Err(ConfigError::invalid_value(
                    "engine.default_method",
                    "must not be blank",
                ));
            }
            Some(_) => {}
        }

        if self.logging.enabled {
            ariadne_telemetry::create_env_filter(&self.logging.level)
                .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))?;
        }

        Ok(())
    }

    /// Create a development configuration preset.
    ///
    /// Pretty debug logs with source locations.
    ///
    /// # Example
    ///
    /// ```
    /// use ariadne_config::AriadneConfig;
    ///
    /// let config = AriadneConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.engine.default_method = Some(DEFAULT_METHOD.to_string());

        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.include_location = true;

        config
    }

    /// Create a production configuration preset.
    ///
    /// JSON info logs.
    ///
    /// # Example
    ///
    /// ```
    /// use ariadne_config::AriadneConfig;
    ///
    /// let config = AriadneConfig::production();
    /// assert_eq!(config.logging.format, ariadne_config::LogFormat::Json);
    /// ```
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.engine.default_method = Some(DEFAULT_METHOD.to_string());

        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config.logging.include_location = false;

        config
    }

    /// Returns an engine builder seeded with the `[engine]` section.
    ///
    /// The locator and warning sink are left to the caller.
    #[must_use]
    pub fn engine_builder<C: Send + 'static>(&self) -> EngineBuilder<C> {
        let builder = Engine::builder().warn_duplicates(self.engine.warn_duplicates);
        match &self.engine.default_method {
            Some(method) => builder.default_method(method.clone()),
            None => builder,
        }
    }

    /// Builds an engine and registers the `[kernel]` section with it.
    ///
    /// Duplicate warnings go to [`TracingWarningSink`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Middleware` if the default method is missing
    /// or a kernel section has the wrong shape.
    pub fn build_engine<C, L>(&self, locator: L) -> Result<Engine<C>, ConfigError>
    where
        C: Send + 'static,
        L: Locator<C>,
    {
        let mut engine = self
            .engine_builder()
            .locator(locator)
            .warning_sink(TracingWarningSink)
            .build()?;
        self.kernel.apply(&mut engine)?;
        Ok(engine)
    }
}

/// Builder for [`AriadneConfig`].
#[derive(Debug, Default)]
pub struct AriadneConfigBuilder {
    engine: Option<EngineConfig>,
    logging: Option<LoggingConfig>,
    kernel: Option<KernelConfig>,
}

impl AriadneConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the engine configuration.
    #[must_use]
    pub fn engine(mut self, engine: EngineConfig) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Set the logging configuration.
    #[must_use]
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Set the kernel.
    #[must_use]
    pub fn kernel(mut self, kernel: KernelConfig) -> Self {
        self.kernel = Some(kernel);
        self
    }

    /// Build the configuration.
    ///
    /// Any unset sections will use their default values.
    #[must_use]
    pub fn build(self) -> AriadneConfig {
        AriadneConfig {
            engine: self.engine.unwrap_or_default(),
            logging: self.logging.unwrap_or_default(),
            kernel: self.kernel.unwrap_or_default(),
        }
    }
}
