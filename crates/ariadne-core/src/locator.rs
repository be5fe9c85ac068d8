//! Namespace resolution.
//!
//! String references registered with the engine are not resolved when they
//! are registered or composed. The executor asks a [`Locator`] for the
//! handler at the moment an entry is reached.
//!
//! # Example
//!
//! ```rust
//! use ariadne_core::{middleware_fn, Locator, MapLocator};
//!
//! let auth = middleware_fn("auth", |ctx: &mut (), next, _params| {
//!     Box::pin(async move { next.run(ctx).await })
//! });
//!
//! let locator = MapLocator::new("handle").bind("App/Middleware/Auth", auth);
//!
//! assert!(locator.resolve("App/Middleware/Auth.handle").is_ok());
//! assert!(locator.resolve("App/Middleware/Cors.handle").is_err());
//! ```

use crate::middleware::BoxedMiddleware;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Error when a namespace cannot be resolved to a handler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("E_UNRESOLVED_MIDDLEWARE: cannot resolve {namespace}: {reason}")]
pub struct ResolutionError {
    /// The namespace that could not be resolved.
    pub namespace: String,
    /// The reason for the failure.
    pub reason: String,
}

impl ResolutionError {
    /// Creates a new resolution error for a namespace nothing is bound to.
    pub fn not_bound(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            reason: "nothing is bound to this namespace".to_string(),
        }
    }

    /// Creates a new resolution error with a custom reason.
    pub fn custom(namespace: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            reason: reason.into(),
        }
    }
}

/// Maps a namespace string to a handler.
///
/// Implementations must be cheap to call: the executor calls `resolve` once
/// per namespace entry it reaches, on every run.
pub trait Locator<C>: Send + Sync + 'static {
    /// Resolves `namespace` (already expanded, e.g. `"Foo.handle"`).
    fn resolve(&self, namespace: &str) -> Result<BoxedMiddleware<C>, ResolutionError>;

    /// The method this locator appends to its own bindings, if any.
    ///
    /// The engine builder rejects a locator whose method differs from the
    /// engine's default method.
    fn default_method(&self) -> Option<&str> {
        None
    }
}

impl<C, L> Locator<C> for Arc<L>
where
    L: Locator<C> + ?Sized,
{
    fn resolve(&self, namespace: &str) -> Result<BoxedMiddleware<C>, ResolutionError> {
        (**self).resolve(namespace)
    }

    fn default_method(&self) -> Option<&str> {
        (**self).default_method()
    }
}

/// A locator that resolves nothing.
///
/// This is the engine default; it is sufficient when every registered
/// middleware is a handler rather than a namespace.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLocator;

impl<C> Locator<C> for NoopLocator {
    fn resolve(&self, namespace: &str) -> Result<BoxedMiddleware<C>, ResolutionError> {
        Err(ResolutionError::custom(namespace, "no locator configured"))
    }
}

/// A mapping-based locator.
///
/// Bindings are made at startup; the map is read-only afterwards. The
/// default method must match the engine's, which
/// [`EngineBuilder::build`](crate::EngineBuilder::build) checks.
pub struct MapLocator<C> {
    default_method: String,
    bindings: HashMap<String, BoxedMiddleware<C>>,
}

impl<C> MapLocator<C> {
    /// Creates an empty locator that expands bare bindings with
    /// `default_method`.
    #[must_use]
    pub fn new(default_method: impl Into<String>) -> Self {
        Self {
            default_method: default_method.into(),
            bindings: HashMap::new(),
        }
    }

    /// Binds `binding.<default_method>` to `handler`.
    #[must_use]
    pub fn bind(mut self, binding: &str, handler: BoxedMiddleware<C>) -> Self {
        self.insert(binding, handler);
        self
    }

    /// Binds an exact namespace to `handler`, without expansion.
    #[must_use]
    pub fn bind_namespace(mut self, namespace: impl Into<String>, handler: BoxedMiddleware<C>) -> Self {
        self.bindings.insert(namespace.into(), handler);
        self
    }

    /// Binds `binding.<default_method>` to `handler` in place.
    pub fn insert(&mut self, binding: &str, handler: BoxedMiddleware<C>) {
        let namespace = format!("{binding}.{}", self.default_method);
        self.bindings.insert(namespace, handler);
    }

    /// Checks if a namespace is bound.
    #[must_use]
    pub fn contains(&self, namespace: &str) -> bool {
        self.bindings.contains_key(namespace)
    }

    /// Returns the number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Returns `true` if nothing is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<C: 'static> Locator<C> for MapLocator<C> {
    fn resolve(&self, namespace: &str) -> Result<BoxedMiddleware<C>, ResolutionError> {
        self.bindings
            .get(namespace)
            .map(Arc::clone)
            .ok_or_else(|| ResolutionError::not_bound(namespace))
    }

    fn default_method(&self) -> Option<&str> {
        Some(&self.default_method)
    }
}

impl<C> fmt::Debug for MapLocator<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapLocator")
            .field("default_method", &self.default_method)
            .field("binding_count", &self.bindings.len())
            .finish()
    }
}
