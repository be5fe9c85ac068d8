//! Warning sinks for duplicate registrations.
//!
//! - [`TracingWarningSink`] forwards warnings to `tracing::warn!`.
//! - [`CollectingWarningSink`] keeps them in memory for tests and startup
//!   diagnostics.
//!
//! # Example
//!
//! ```
//! use ariadne_core::Engine;
//! use ariadne_telemetry::CollectingWarningSink;
//!
//! let warnings = CollectingWarningSink::new();
//! let mut engine: Engine<()> = Engine::builder()
//!     .default_method("handle")
//!     .warning_sink(warnings.clone())
//!     .build()
//!     .unwrap();
//!
//! engine.register_global(["Cors", "Cors"]);
//! assert_eq!(warnings.len(), 1);
//! ```

use ariadne_core::{Category, WarningSink};
use parking_lot::Mutex;
use std::sync::Arc;

/// Sink that logs each warning as a `tracing` warn event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingWarningSink;

impl WarningSink for TracingWarningSink {
    fn emit(&self, message: &str) {
        tracing::warn!(target: "ariadne::registry", "{message}");
    }

    fn emit_duplicate(&self, category: Category, name: &str, message: &str) {
        tracing::warn!(
            target: "ariadne::registry",
            category = category.as_str(),
            middleware = %name,
            "{message}"
        );
    }
}

/// Sink that stores every warning it receives.
///
/// Clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct CollectingWarningSink {
    messages: Arc<Mutex<Vec<String>>>,
}

impl CollectingWarningSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the collected messages, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    /// Returns the number of collected messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    /// Returns `true` if nothing has been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }

    /// Removes and returns all collected messages.
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.messages.lock())
    }
}

impl WarningSink for CollectingWarningSink {
    fn emit(&self, message: &str) {
        self.messages.lock().push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_sink_shares_buffer() {
        let sink = CollectingWarningSink::new();
        let clone = sink.clone();

        clone.emit("first");
        clone.emit("second");

        assert_eq!(sink.messages(), vec!["first", "second"]);
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn test_collecting_sink_drain() {
        let sink = CollectingWarningSink::new();
        sink.emit("only");

        assert_eq!(sink.drain(), vec!["only"]);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_tracing_sink_without_subscriber() {
        TracingWarningSink.emit("nobody listens");
    }
}
