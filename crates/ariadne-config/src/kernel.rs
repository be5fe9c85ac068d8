//! Applying a declarative kernel to an engine.

use crate::schema::KernelConfig;
use ariadne_core::{Engine, MiddlewareResult};

impl KernelConfig {
    /// Returns `true` if no section is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.global.is_none() && self.named.is_none() && self.server.is_none()
    }

    /// Registers every configured section with `engine`.
    ///
    /// Sections are applied global, named, then server. The first section
    /// the engine rejects stops the process; earlier sections stay
    /// registered.
    ///
    /// # Errors
    ///
    /// `InputType` or `InvalidType` when a section has the wrong shape.
    ///
    /// # Example
    ///
    /// ```
    /// use ariadne_config::KernelConfig;
    /// use ariadne_core::Engine;
    /// use serde_json::json;
    ///
    /// let kernel = KernelConfig {
    ///     global: Some(json!(["App/Middleware/BodyParser"])),
    ///     named: Some(json!({ "auth": "App/Middleware/Auth" })),
    ///     server: None,
    /// };
    ///
    /// let mut engine: Engine<()> = Engine::new("handle").unwrap();
    /// kernel.apply(&mut engine).unwrap();
    ///
    /// assert_eq!(engine.global().len(), 1);
    /// assert!(engine.named().contains_key("auth"));
    /// ```
    pub fn apply<C: Send + 'static>(&self, engine: &mut Engine<C>) -> MiddlewareResult<()> {
        if let Some(global) = &self.global {
            engine.register_global_value(global)?;
        }
        if let Some(named) = &self.named {
            engine.register_named_value(named)?;
        }
        if let Some(server) = &self.server {
            engine.use_value(server)?;
        }

        Ok(())
    }
}
