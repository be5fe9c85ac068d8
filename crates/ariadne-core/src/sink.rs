//! Warning sink.
//!
//! Duplicate registrations are downgraded to warnings. The engine hands the
//! message to an optional [`WarningSink`]; when none is configured the
//! message is dropped.

use crate::registry::{duplicate_warning, Category};
use std::fmt;
use std::sync::Arc;

/// Receives warning messages emitted by the engine.
pub trait WarningSink: Send + Sync + 'static {
    /// Emits a single warning message.
    fn emit(&self, message: &str);

    /// Emits the warning for a registration ignored as a duplicate.
    ///
    /// `name` is the alias or handler display name. The default forwards
    /// `message` to [`WarningSink::emit`].
    fn emit_duplicate(&self, category: Category, name: &str, message: &str) {
        let _ = (category, name);
        self.emit(message);
    }
}

impl<F> WarningSink for F
where
    F: Fn(&str) + Send + Sync + 'static,
{
    fn emit(&self, message: &str) {
        self(message);
    }
}

/// A shared, type-erased warning sink.
pub type SharedWarningSink = Arc<dyn WarningSink>;

/// Wrapper that lets an optional sink be stored and debugged.
#[derive(Clone)]
pub(crate) struct Warnings {
    sink: Option<SharedWarningSink>,
    enabled: bool,
}

impl Warnings {
    pub(crate) fn new(sink: Option<SharedWarningSink>, enabled: bool) -> Self {
        Self { sink, enabled }
    }

    pub(crate) fn emit_duplicate(&self, category: Category, name: &str) {
        if !self.enabled {
            return;
        }
        if let Some(sink) = &self.sink {
            sink.emit_duplicate(category, name, &duplicate_warning(category, name));
        }
    }
}

impl fmt::Debug for Warnings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Warnings")
            .field("has_sink", &self.sink.is_some())
            .field("enabled", &self.enabled)
            .finish()
    }
}
