//! Registered middleware entries and the specs they are built from.

use crate::locator::{Locator, ResolutionError};
use crate::middleware::{BoxedMiddleware, FnMiddleware, Middleware};
use std::fmt;
use std::sync::Arc;

/// Reference to the handler behind an entry.
pub enum HandlerRef<C> {
    /// A fully expanded namespace (`"App/Middleware/Auth.handle"`), resolved
    /// through the locator when the entry is reached.
    Namespace(String),
    /// A handler supplied directly at registration.
    Callable(BoxedMiddleware<C>),
}

impl<C> HandlerRef<C> {
    /// Returns the namespace, if this is a string reference.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        match self {
            Self::Namespace(namespace) => Some(namespace),
            Self::Callable(_) => None,
        }
    }

    /// Returns `true` if this reference is a handler rather than a namespace.
    #[must_use]
    pub const fn is_callable(&self) -> bool {
        matches!(self, Self::Callable(_))
    }

    /// Resolves this reference to a handler.
    ///
    /// Callables resolve to themselves; namespaces go through the locator.
    pub fn resolve(&self, locator: &dyn Locator<C>) -> Result<BoxedMiddleware<C>, ResolutionError>
    where
        C: 'static,
    {
        match self {
            Self::Callable(handler) => Ok(Arc::clone(handler)),
            Self::Namespace(namespace) => locator.resolve(namespace),
        }
    }
}

impl<C> Clone for HandlerRef<C> {
    fn clone(&self) -> Self {
        match self {
            Self::Namespace(namespace) => Self::Namespace(namespace.clone()),
            Self::Callable(handler) => Self::Callable(Arc::clone(handler)),
        }
    }
}

// Namespaces compare by value, callables by identity.
impl<C> PartialEq for HandlerRef<C> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Namespace(a), Self::Namespace(b)) => a == b,
            (Self::Callable(a), Self::Callable(b)) => {
                Arc::as_ptr(a).cast::<()>() == Arc::as_ptr(b).cast::<()>()
            }
            _ => false,
        }
    }
}

impl<C> Eq for HandlerRef<C> {}

impl<C: 'static> fmt::Display for HandlerRef<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Namespace(namespace) => f.write_str(namespace),
            Self::Callable(handler) => f.write_str(handler.name()),
        }
    }
}

impl<C: 'static> fmt::Debug for HandlerRef<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Namespace(namespace) => f.debug_tuple("Namespace").field(namespace).finish(),
            Self::Callable(handler) => f.debug_tuple("Callable").field(&handler.name()).finish(),
        }
    }
}

/// A handler reference together with its inline params.
///
/// Entries are never mutated after they are built. `params` is always
/// present and empty unless the use-time spec carried `":p1,p2"`.
pub struct MiddlewareEntry<C> {
    handler: HandlerRef<C>,
    params: Vec<String>,
}

impl<C> MiddlewareEntry<C> {
    /// Creates a new entry.
    #[must_use]
    pub fn new(handler: HandlerRef<C>, params: Vec<String>) -> Self {
        Self { handler, params }
    }

    /// Creates an entry for an expanded namespace with no params.
    #[must_use]
    pub fn namespace(namespace: impl Into<String>) -> Self {
        Self::new(HandlerRef::Namespace(namespace.into()), Vec::new())
    }

    /// Creates an entry for a handler with no params.
    #[must_use]
    pub fn callable(handler: BoxedMiddleware<C>) -> Self {
        Self::new(HandlerRef::Callable(handler), Vec::new())
    }

    /// Returns the handler reference.
    #[must_use]
    pub const fn handler(&self) -> &HandlerRef<C> {
        &self.handler
    }

    /// Returns the inline params.
    #[must_use]
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Returns a copy of this entry carrying `params` instead.
    #[must_use]
    pub(crate) fn with_params(&self, params: Vec<String>) -> Self {
        Self::new(self.handler.clone(), params)
    }
}

impl<C> Clone for MiddlewareEntry<C> {
    fn clone(&self) -> Self {
        Self::new(self.handler.clone(), self.params.clone())
    }
}

impl<C> PartialEq for MiddlewareEntry<C> {
    fn eq(&self, other: &Self) -> bool {
        self.handler == other.handler && self.params == other.params
    }
}

impl<C> Eq for MiddlewareEntry<C> {}

impl<C: 'static> fmt::Debug for MiddlewareEntry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareEntry")
            .field("handler", &self.handler)
            .field("params", &self.params)
            .finish()
    }
}

/// A registration-time or use-time description of a middleware.
///
/// At registration a reference is a bare namespace (`"App/Middleware/Auth"`).
/// When compiling named middleware it is an alias, optionally with inline
/// params (`"auth:jwt"`).
pub enum MiddlewareSpec<C> {
    /// A string reference.
    Reference(String),
    /// A handler supplied directly.
    Handler(BoxedMiddleware<C>),
}

impl<C: 'static> MiddlewareSpec<C> {
    /// Name used in duplicate warnings.
    pub(crate) fn display_name(&self) -> &str {
        match self {
            Self::Reference(reference) => reference,
            Self::Handler(handler) => handler.name(),
        }
    }
}

impl<C> Clone for MiddlewareSpec<C> {
    fn clone(&self) -> Self {
        match self {
            Self::Reference(reference) => Self::Reference(reference.clone()),
            Self::Handler(handler) => Self::Handler(Arc::clone(handler)),
        }
    }
}

impl<C: 'static> fmt::Debug for MiddlewareSpec<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reference(reference) => f.debug_tuple("Reference").field(reference).finish(),
            Self::Handler(handler) => f.debug_tuple("Handler").field(&handler.name()).finish(),
        }
    }
}

impl<C> From<&str> for MiddlewareSpec<C> {
    fn from(reference: &str) -> Self {
        Self::Reference(reference.to_string())
    }
}

impl<C> From<String> for MiddlewareSpec<C> {
    fn from(reference: String) -> Self {
        Self::Reference(reference)
    }
}

impl<C> From<&String> for MiddlewareSpec<C> {
    fn from(reference: &String) -> Self {
        Self::Reference(reference.clone())
    }
}

impl<C> From<BoxedMiddleware<C>> for MiddlewareSpec<C> {
    fn from(handler: BoxedMiddleware<C>) -> Self {
        Self::Handler(handler)
    }
}

impl<C> From<&BoxedMiddleware<C>> for MiddlewareSpec<C> {
    fn from(handler: &BoxedMiddleware<C>) -> Self {
        Self::Handler(Arc::clone(handler))
    }
}

impl<C, F> From<FnMiddleware<F>> for MiddlewareSpec<C>
where
    FnMiddleware<F>: Middleware<C>,
{
    fn from(handler: FnMiddleware<F>) -> Self {
        Self::Handler(Arc::new(handler))
    }
}
