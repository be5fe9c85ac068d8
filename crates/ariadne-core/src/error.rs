//! Error types for Ariadne.
//!
//! This module provides [`MiddlewareError`], the single error type returned by
//! registration, compilation, composition and execution.
//!
//! # Propagation
//!
//! | Phase | Variants | Surfaces |
//! |---|---|---|
//! | Construction | `Configuration` | synchronously from `EngineBuilder::build` |
//! | Registration | `InputType`, `InvalidType` | synchronously from the `*_value` entry points |
//! | Compilation | `MissingNamed`, `InvalidType` | synchronously from `compile_named` / `compose_global_and_named` |
//! | Execution | `Resolution`, `Handler`, `ParamsNotBound`, `ParamsAlreadyBound` | from the future returned by `Pipeline::run` |
//!
//! Duplicate registrations are not errors; they are reported through the
//! engine's [`WarningSink`](crate::WarningSink).

use crate::locator::ResolutionError;
use thiserror::Error;

/// Result type alias using [`MiddlewareError`].
pub type MiddlewareResult<T> = Result<T, MiddlewareError>;

/// Standard error type for Ariadne.
///
/// # Example
///
/// ```
/// use ariadne_core::MiddlewareError;
///
/// let err = MiddlewareError::missing_named("auth");
/// assert_eq!(err.code(), "E_MISSING_NAMED_MIDDLEWARE");
/// assert!(err.to_string().contains("{auth}"));
/// ```
#[derive(Error, Debug)]
pub enum MiddlewareError {
    /// The engine was constructed without a usable default method.
    #[error("E_INVALID_CONFIGURATION: {message}")]
    Configuration {
        /// Human-readable error message.
        message: String,
    },

    /// A registration entry point received a value of the wrong shape.
    #[error("E_INVALID_PARAMETER: {method} accepts {expected} instead received {received}")]
    InputType {
        /// The operation that rejected the input.
        method: &'static str,
        /// Description of the accepted shape.
        expected: &'static str,
        /// The kind of value that was received.
        received: &'static str,
    },

    /// A compiled spec references a name that was never registered.
    #[error(
        "E_MISSING_NAMED_MIDDLEWARE: Cannot find any named middleware for {{{name}}}. \
         Make sure you have registered it."
    )]
    MissingNamed {
        /// The unregistered name.
        name: String,
    },

    /// A spec item is neither a reference string nor a handler.
    #[error(
        "E_INVALID_MIDDLEWARE_TYPE: Middleware must be a function or reference to a resolvable string."
    )]
    InvalidType,

    /// The locator could not resolve a namespace at invocation time.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// `Pipeline::run` was called before `Pipeline::params`.
    #[error("E_PARAMS_NOT_BOUND: runtime params must be bound with `params` before `run`")]
    ParamsNotBound,

    /// `Pipeline::run_with` was called on a pipeline that already owns a
    /// context bound with `Pipeline::params`.
    #[error("E_PARAMS_ALREADY_BOUND: a pipeline with bound params must be executed with `run`")]
    ParamsAlreadyBound,

    /// A handler failed. The underlying error is forwarded unmodified.
    #[error(transparent)]
    Handler(#[from] anyhow::Error),
}

impl MiddlewareError {
    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates an input type error.
    #[must_use]
    pub const fn input_type(
        method: &'static str,
        expected: &'static str,
        received: &'static str,
    ) -> Self {
        Self::InputType {
            method,
            expected,
            received,
        }
    }

    /// Creates a missing named middleware error.
    #[must_use]
    pub fn missing_named(name: impl Into<String>) -> Self {
        Self::MissingNamed { name: name.into() }
    }

    /// Wraps an arbitrary handler failure.
    #[must_use]
    pub fn handler<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Handler(anyhow::Error::new(error))
    }

    /// Creates a handler failure from a message.
    #[must_use]
    pub fn message(message: impl std::fmt::Display + std::fmt::Debug + Send + Sync + 'static) -> Self {
        Self::Handler(anyhow::Error::msg(message))
    }

    /// Returns the stable error code for this error.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "E_INVALID_CONFIGURATION",
            Self::InputType { .. } => "E_INVALID_PARAMETER",
            Self::MissingNamed { .. } => "E_MISSING_NAMED_MIDDLEWARE",
            Self::InvalidType => "E_INVALID_MIDDLEWARE_TYPE",
            Self::Resolution(_) => "E_UNRESOLVED_MIDDLEWARE",
            Self::ParamsNotBound => "E_PARAMS_NOT_BOUND",
            Self::ParamsAlreadyBound => "E_PARAMS_ALREADY_BOUND",
            Self::Handler(_) => "E_HANDLER_FAILED",
        }
    }

    /// Returns `true` if this error was raised before any handler ran.
    #[must_use]
    pub const fn is_setup_error(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. }
                | Self::InputType { .. }
                | Self::MissingNamed { .. }
                | Self::InvalidType
        )
    }
}

/// Returns the JSON kind of a value, as used in `InputType` messages.
pub(crate) const fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
