//! Typed configuration for Ariadne.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides (`ARIADNE__SECTION__KEY`)
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//! - A declarative *kernel*: middleware lists registered from configuration
//!
//! # Sections
//!
//! - [`EngineConfig`] - default method and duplicate warnings
//! - [`LoggingConfig`] - log level and format
//! - [`KernelConfig`] - global, named and server registrations
//!
//! # Example
//!
//! ```
//! use ariadne_config::ConfigLoader;
//! use ariadne_core::NoopLocator;
//!
//! let toml = r#"
//!     [engine]
//!     default_method = "handle"
//!
//!     [kernel]
//!     server = ["App/Middleware/Cors"]
//!
//!     [kernel.named]
//!     auth = "App/Middleware/Auth"
//! "#;
//!
//! let config = ConfigLoader::new()
//!     .with_string(toml, "toml")
//!     .unwrap()
//!     .load()
//!     .unwrap();
//!
//! let engine = config.build_engine::<(), _>(NoopLocator).unwrap();
//! assert_eq!(engine.compose_server().names(), vec!["App/Middleware/Cors.handle"]);
//! assert!(engine.named().contains_key("auth"));
//! ```

#![doc(html_root_url = "https://docs.rs/ariadne-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod kernel;
mod loader;
mod schema;

pub use config::{AriadneConfig, AriadneConfigBuilder};
pub use error::ConfigError;
pub use loader::{ConfigLoader, DEFAULT_ENV_PREFIX};
pub use schema::{EngineConfig, KernelConfig, LogFormat, LoggingConfig};
