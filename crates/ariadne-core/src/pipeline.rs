//! Composed middleware pipeline.
//!
//! A [`Pipeline`] is produced by [`Engine::compose_server`] or
//! [`Engine::compose_global_and_named`]. It owns a snapshot of the entries
//! it was composed from, is bound to a context with [`Pipeline::params`],
//! and is consumed by [`Pipeline::run`].
//!
//! ## Execution
//!
//! ```text
//! run() → entry[0](ctx, next₁, params₀)
//!              └─ next₁.run(ctx) → entry[1](ctx, next₂, params₁)
//!                                       └─ next₂.run(ctx) → … → end of chain
//! ```
//!
//! - Entries run strictly in order, one at a time.
//! - A handler that returns without calling `next` ends the chain; the run
//!   still succeeds.
//! - The first error (a handler failure or a namespace the locator cannot
//!   resolve) fails the run. Nothing downstream executes.
//! - `run` completes once the outermost handler's future settles, which
//!   includes any work a handler does after `next.run(ctx).await`.
//!
//! [`Engine::compose_server`]: crate::Engine::compose_server
//! [`Engine::compose_global_and_named`]: crate::Engine::compose_global_and_named

use crate::entry::MiddlewareEntry;
use crate::error::{MiddlewareError, MiddlewareResult};
use crate::locator::Locator;
use crate::middleware::{Cursor, Next};
use std::fmt;
use std::sync::Arc;
use tracing::Instrument;

/// An ordered, executable middleware chain.
pub struct Pipeline<C> {
    entries: Vec<MiddlewareEntry<C>>,
    locator: Arc<dyn Locator<C>>,
    params: Option<C>,
}

impl<C: Send + 'static> Pipeline<C> {
    pub(crate) fn new(entries: Vec<MiddlewareEntry<C>>, locator: Arc<dyn Locator<C>>) -> Self {
        Self {
            entries,
            locator,
            params: None,
        }
    }

    /// Binds the context every handler in the chain receives.
    ///
    /// Several runtime values are bound as a tuple or struct.
    #[must_use]
    pub fn params(mut self, ctx: C) -> Self {
        self.params = Some(ctx);
        self
    }

    /// Returns the entries in execution order.
    #[must_use]
    pub fn entries(&self) -> &[MiddlewareEntry<C>] {
        &self.entries
    }

    /// Returns the display names of the entries in execution order.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| entry.handler().to_string())
            .collect()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the pipeline has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Runs the chain over the bound context and hands the context back.
    ///
    /// # Errors
    ///
    /// - `ParamsNotBound` if [`Pipeline::params`] was never called.
    /// - `Resolution` if a namespace reached during the run cannot be
    ///   resolved.
    /// - Any error returned by a handler, unmodified.
    pub async fn run(self) -> MiddlewareResult<C> {
        let Self {
            entries,
            locator,
            params,
        } = self;
        let mut ctx = params.ok_or(MiddlewareError::ParamsNotBound)?;
        execute(&entries, locator.as_ref(), &mut ctx).await?;
        Ok(ctx)
    }

    /// Runs the chain over a context the caller keeps ownership of.
    ///
    /// # Errors
    ///
    /// - `ParamsAlreadyBound` if [`Pipeline::params`] was called; nothing
    ///   runs.
    /// - Otherwise the same as [`Pipeline::run`], minus `ParamsNotBound`.
    pub async fn run_with(self, ctx: &mut C) -> MiddlewareResult<()> {
        if self.params.is_some() {
            return Err(MiddlewareError::ParamsAlreadyBound);
        }
        execute(&self.entries, self.locator.as_ref(), ctx).await
    }
}

async fn execute<C: Send + 'static>(
    entries: &[MiddlewareEntry<C>],
    locator: &dyn Locator<C>,
    ctx: &mut C,
) -> MiddlewareResult<()> {
    let span = tracing::info_span!("pipeline.run", entries = entries.len());
    let cursor = Cursor::default();

    let result = Next::new(entries, locator, &cursor)
        .run(ctx)
        .instrument(span)
        .await;

    match &result {
        Ok(()) => tracing::debug!(
            invoked = cursor.invoked(),
            short_circuited = !cursor.completed(),
            "pipeline finished"
        ),
        Err(err) => tracing::warn!(
            invoked = cursor.invoked(),
            code = err.code(),
            error = %err,
            "pipeline failed"
        ),
    }

    result
}

impl<C: 'static> fmt::Debug for Pipeline<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("entries", &self.entries)
            .field("params_bound", &self.params.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::{MapLocator, NoopLocator};
    use crate::middleware::{middleware_fn, BoxedMiddleware};
    use std::sync::atomic::{AtomicUsize, Ordering};

    type Trail = Vec<&'static str>;

    fn marker(name: &'static str) -> BoxedMiddleware<Trail> {
        middleware_fn(name, move |ctx: &mut Trail, next, _params| {
            Box::pin(async move {
                ctx.push(name);
                next.run(ctx).await
            })
        })
    }

    fn pipeline(handlers: Vec<BoxedMiddleware<Trail>>) -> Pipeline<Trail> {
        let entries = handlers.into_iter().map(MiddlewareEntry::callable).collect();
        Pipeline::new(entries, Arc::new(NoopLocator))
    }

    #[tokio::test]
    async fn test_run_in_order() {
        let trail = pipeline(vec![marker("first"), marker("second"), marker("third")])
            .params(Vec::new())
            .run()
            .await
            .unwrap();

        assert_eq!(trail, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_empty_pipeline() {
        let trail = pipeline(Vec::new()).params(Vec::new()).run().await.unwrap();
        assert!(trail.is_empty());
    }

    #[tokio::test]
    async fn test_run_without_params() {
        let err = pipeline(vec![marker("first")]).run().await.unwrap_err();
        assert!(matches!(err, MiddlewareError::ParamsNotBound));
    }

    #[tokio::test]
    async fn test_run_with_borrowed_context() {
        let mut trail = vec!["caller"];
        pipeline(vec![marker("first")])
            .run_with(&mut trail)
            .await
            .unwrap();

        assert_eq!(trail, vec!["caller", "first"]);
    }

    #[tokio::test]
    async fn test_run_with_rejects_bound_params() {
        let mut trail = vec!["caller"];
        let err = pipeline(vec![marker("first")])
            .params(vec!["bound"])
            .run_with(&mut trail)
            .await
            .unwrap_err();

        assert!(matches!(err, MiddlewareError::ParamsAlreadyBound));
        assert_eq!(err.code(), "E_PARAMS_ALREADY_BOUND");
        assert_eq!(trail, vec!["caller"]);
    }

    #[tokio::test]
    async fn test_post_processing_runs_after_downstream() {
        let onion = middleware_fn("onion", |ctx: &mut Trail, next, _params| {
            Box::pin(async move {
                ctx.push("before");
                next.run(ctx).await?;
                ctx.push("after");
                Ok(())
            })
        });

        let trail = pipeline(vec![onion, marker("inner")])
            .params(Vec::new())
            .run()
            .await
            .unwrap();

        assert_eq!(trail, vec!["before", "inner", "after"]);
    }

    #[tokio::test]
    async fn test_short_circuit_stops_chain() {
        let reached = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&reached);
        let gate = middleware_fn("gate", |ctx: &mut Trail, _next, _params| {
            Box::pin(async move {
                ctx.push("gate");
                Ok(())
            })
        });
        let downstream = middleware_fn("downstream", move |ctx: &mut Trail, next, _params| {
            counter.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move { next.run(ctx).await })
        });

        let trail = pipeline(vec![gate, downstream])
            .params(Vec::new())
            .run()
            .await
            .unwrap();

        assert_eq!(trail, vec!["gate"]);
        assert_eq!(reached.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_handler_error_fails_fast() {
        let failing = middleware_fn("failing", |_ctx: &mut Trail, _next, _params| {
            Box::pin(async { Err(MiddlewareError::message("denied")) })
        });

        let mut trail = Vec::new();
        let err = pipeline(vec![marker("first"), failing, marker("never")])
            .run_with(&mut trail)
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "denied");
        assert_eq!(trail, vec!["first"]);
    }

    #[tokio::test]
    async fn test_namespace_resolved_lazily() {
        let locator = MapLocator::new("handle").bind("Second", marker("second"));
        let entries = vec![
            MiddlewareEntry::callable(marker("first")),
            MiddlewareEntry::namespace("Second.handle"),
        ];

        let trail = Pipeline::new(entries, Arc::new(locator))
            .params(Vec::new())
            .run()
            .await
            .unwrap();

        assert_eq!(trail, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_unresolvable_namespace_fails_run() {
        let entries = vec![
            MiddlewareEntry::callable(marker("first")),
            MiddlewareEntry::namespace("Missing.handle"),
        ];

        let mut trail = Vec::new();
        let err = Pipeline::new(entries, Arc::new(NoopLocator))
            .run_with(&mut trail)
            .await
            .unwrap_err();

        assert!(matches!(err, MiddlewareError::Resolution(ref e) if e.namespace == "Missing.handle"));
        assert_eq!(trail, vec!["first"]);
    }

    #[tokio::test]
    async fn test_unreached_namespace_is_never_resolved() {
        let gate = middleware_fn("gate", |_ctx: &mut Trail, _next, _params| {
            Box::pin(async { Ok(()) })
        });
        let entries = vec![
            MiddlewareEntry::callable(gate),
            MiddlewareEntry::namespace("Missing.handle"),
        ];

        let result = Pipeline::new(entries, Arc::new(NoopLocator))
            .params(Vec::new())
            .run()
            .await;

        assert!(result.is_ok());
    }

    #[test]
    fn test_pipeline_introspection() {
        let p = pipeline(vec![marker("first"), marker("second")]);
        assert_eq!(p.len(), 2);
        assert!(!p.is_empty());
        assert_eq!(p.names(), vec!["first", "second"]);
        assert!(format!("{p:?}").contains("params_bound: false"));
    }
}
