//! Core middleware trait and continuation types.
//!
//! This module defines the [`Middleware`] trait that every handler in a chain
//! implements, and [`Next`], the continuation a handler invokes to hand
//! control to the rest of the chain.
//!
//! # Example
//!
//! ```
//! use ariadne_core::{BoxFuture, Middleware, MiddlewareResult, Next};
//!
//! struct Logging;
//!
//! impl Middleware<Vec<String>> for Logging {
//!     fn name(&self) -> &str {
//!         "logging"
//!     }
//!
//!     fn handle<'a>(
//!         &'a self,
//!         ctx: &'a mut Vec<String>,
//!         next: Next<'a, Vec<String>>,
//!         _params: &'a [String],
//!     ) -> BoxFuture<'a, MiddlewareResult<()>> {
//!         Box::pin(async move {
//!             ctx.push("before".to_string());
//!             next.run(ctx).await?;
//!             ctx.push("after".to_string());
//!             Ok(())
//!         })
//!     }
//! }
//! ```

use crate::entry::MiddlewareEntry;
use crate::error::MiddlewareResult;
use crate::locator::Locator;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// A boxed future, borrowed for `'a`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A type-erased middleware that can be stored in the registry.
pub type BoxedMiddleware<C> = Arc<dyn Middleware<C>>;

/// The core middleware trait.
///
/// A middleware receives the shared context, the continuation for the rest
/// of the chain, and the inline params attached to its spec
/// (`"auth:jwt"` yields `["jwt"]`).
///
/// # Invariants
///
/// - Calling `next.run(ctx)` hands control downstream; it can be called at
///   most once because [`Next`] is consumed.
/// - Returning without calling `next` stops the chain. This is not an error.
/// - Returning `Err` fails the whole run; no further entries execute.
pub trait Middleware<C>: Send + Sync + 'static {
    /// Returns the name of this middleware.
    ///
    /// Used in duplicate-registration warnings and log fields.
    fn name(&self) -> &str;

    /// Process the context through this middleware.
    fn handle<'a>(
        &'a self,
        ctx: &'a mut C,
        next: Next<'a, C>,
        params: &'a [String],
    ) -> BoxFuture<'a, MiddlewareResult<()>>;
}

/// Shared progress of a single chain execution.
#[derive(Debug, Default)]
pub(crate) struct Cursor {
    invoked: AtomicUsize,
    completed: AtomicBool,
}

impl Cursor {
    /// Number of entries that have been invoked so far.
    pub(crate) fn invoked(&self) -> usize {
        self.invoked.load(Ordering::Acquire)
    }

    /// Whether the last continuation ran past the end of the chain.
    pub(crate) fn completed(&self) -> bool {
        self.completed.load(Ordering::Acquire)
    }
}

/// Continuation that invokes the rest of the chain.
///
/// `Next` is single-use: [`Next::run`] takes `self`, so a handler cannot
/// advance the chain twice.
pub struct Next<'a, C> {
    remaining: &'a [MiddlewareEntry<C>],
    locator: &'a dyn Locator<C>,
    cursor: &'a Cursor,
}

impl<'a, C: Send + 'static> Next<'a, C> {
    pub(crate) fn new(
        remaining: &'a [MiddlewareEntry<C>],
        locator: &'a dyn Locator<C>,
        cursor: &'a Cursor,
    ) -> Self {
        Self {
            remaining,
            locator,
            cursor,
        }
    }

    /// Number of entries left downstream of this continuation.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.remaining.len()
    }

    /// Invokes the next entry in the chain, or completes the chain if none
    /// are left.
    ///
    /// String references are resolved through the locator here, at the
    /// moment the entry is reached, so entries behind a short-circuit are
    /// never resolved.
    pub async fn run(self, ctx: &mut C) -> MiddlewareResult<()> {
        let Some((entry, rest)) = self.remaining.split_first() else {
            self.cursor.completed.store(true, Ordering::Release);
            return Ok(());
        };

        let index = self.cursor.invoked.fetch_add(1, Ordering::AcqRel);
        let handler = entry.handler().resolve(self.locator)?;
        tracing::trace!(index, middleware = %entry.handler(), "invoking middleware");

        let next = Next::new(rest, self.locator, self.cursor);
        handler.handle(ctx, next, entry.params()).await
    }
}

impl<C> fmt::Debug for Next<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("remaining", &self.remaining.len())
            .finish_non_exhaustive()
    }
}

/// A middleware created from a closure.
///
/// Prefer [`middleware_fn`], which pins down the closure signature so the
/// compiler can infer the borrowed lifetimes.
pub struct FnMiddleware<F> {
    name: String,
    func: F,
}

impl<F> FnMiddleware<F> {
    /// Creates a new function-based middleware.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> fmt::Debug for FnMiddleware<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnMiddleware")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<C, F> Middleware<C> for FnMiddleware<F>
where
    C: Send + 'static,
    F: for<'a> Fn(&'a mut C, Next<'a, C>, &'a [String]) -> BoxFuture<'a, MiddlewareResult<()>>
        + Send
        + Sync
        + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn handle<'a>(
        &'a self,
        ctx: &'a mut C,
        next: Next<'a, C>,
        params: &'a [String],
    ) -> BoxFuture<'a, MiddlewareResult<()>> {
        (self.func)(ctx, next, params)
    }
}

/// Builds a shared middleware from a closure.
///
/// # Example
///
/// ```
/// use ariadne_core::middleware_fn;
///
/// let counter = middleware_fn("counter", |ctx: &mut u32, next, _params| {
///     Box::pin(async move {
///         *ctx += 1;
///         next.run(ctx).await
///     })
/// });
/// assert_eq!(counter.name(), "counter");
/// ```
pub fn middleware_fn<C, F>(name: impl Into<String>, func: F) -> BoxedMiddleware<C>
where
    C: Send + 'static,
    F: for<'a> Fn(&'a mut C, Next<'a, C>, &'a [String]) -> BoxFuture<'a, MiddlewareResult<()>>
        + Send
        + Sync
        + 'static,
{
    Arc::new(FnMiddleware::new(name, func))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::HandlerRef;
    use crate::locator::NoopLocator;

    struct Recording {
        name: &'static str,
    }

    impl Middleware<Vec<&'static str>> for Recording {
        fn name(&self) -> &str {
            self.name
        }

        fn handle<'a>(
            &'a self,
            ctx: &'a mut Vec<&'static str>,
            next: Next<'a, Vec<&'static str>>,
            _params: &'a [String],
        ) -> BoxFuture<'a, MiddlewareResult<()>> {
            Box::pin(async move {
                ctx.push(self.name);
                next.run(ctx).await
            })
        }
    }

    fn entry(name: &'static str) -> MiddlewareEntry<Vec<&'static str>> {
        MiddlewareEntry::new(HandlerRef::Callable(Arc::new(Recording { name })), Vec::new())
    }

    #[tokio::test]
    async fn test_next_on_empty_chain_completes() {
        let cursor = Cursor::default();
        let locator = NoopLocator;
        let mut ctx: Vec<&'static str> = Vec::new();

        Next::new(&[], &locator, &cursor).run(&mut ctx).await.unwrap();

        assert!(cursor.completed());
        assert_eq!(cursor.invoked(), 0);
    }

    #[tokio::test]
    async fn test_next_walks_chain() {
        let entries = vec![entry("first"), entry("second")];
        let cursor = Cursor::default();
        let locator = NoopLocator;
        let mut ctx = Vec::new();

        Next::new(&entries, &locator, &cursor)
            .run(&mut ctx)
            .await
            .unwrap();

        assert_eq!(ctx, vec!["first", "second"]);
        assert_eq!(cursor.invoked(), 2);
        assert!(cursor.completed());
    }

    #[tokio::test]
    async fn test_fn_middleware_receives_params() {
        let seen = middleware_fn("seen", |ctx: &mut Vec<String>, next, params| {
            Box::pin(async move {
                ctx.extend(params.iter().cloned());
                next.run(ctx).await
            })
        });
        let entries = vec![MiddlewareEntry::new(
            HandlerRef::Callable(seen),
            vec!["jwt".to_string(), "session".to_string()],
        )];
        let cursor = Cursor::default();
        let locator = NoopLocator;
        let mut ctx = Vec::new();

        Next::new(&entries, &locator, &cursor)
            .run(&mut ctx)
            .await
            .unwrap();

        assert_eq!(ctx, vec!["jwt", "session"]);
    }

    #[test]
    fn test_fn_middleware_name() {
        let mw: BoxedMiddleware<()> =
            middleware_fn("noop", |_ctx: &mut (), _next, _params| Box::pin(async { Ok(()) }));
        assert_eq!(mw.name(), "noop");
    }

    #[test]
    fn test_next_debug() {
        let entries = vec![entry("only")];
        let cursor = Cursor::default();
        let locator = NoopLocator;
        let next = Next::new(&entries, &locator, &cursor);
        assert_eq!(next.remaining(), 1);
        assert!(format!("{next:?}").contains("remaining: 1"));
    }
}
