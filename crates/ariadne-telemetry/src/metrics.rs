//! Prometheus metrics for Ariadne.
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `ariadne_middleware_invocations_total` | Counter | `middleware`, `outcome` | Handler invocations |
//! | `ariadne_middleware_duration_seconds` | Histogram | `middleware` | Time until the handler settles, downstream included |
//! | `ariadne_duplicate_registrations_total` | Counter | `category` | Registrations ignored as duplicates |
//!
//! Handlers are measured only when wrapped with [`instrument`]:
//!
//! ```
//! use ariadne_core::{middleware_fn, Engine};
//! use ariadne_telemetry::metrics::instrument;
//!
//! let auth = middleware_fn("auth", |ctx: &mut (), next, _params| {
//!     Box::pin(async move { next.run(ctx).await })
//! });
//!
//! let mut engine: Engine<()> = Engine::new("handle").unwrap();
//! engine.register_named([("auth", instrument(auth))]);
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use ariadne_core::{
    BoxFuture, BoxedMiddleware, Category, Middleware, MiddlewareResult, Next, SharedWarningSink,
    WarningSink,
};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::fmt;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

/// Invocation counter name.
pub const INVOCATIONS_TOTAL: &str = "ariadne_middleware_invocations_total";

/// Handler duration histogram name.
pub const DURATION_SECONDS: &str = "ariadne_middleware_duration_seconds";

/// Duplicate registration counter name.
pub const DUPLICATES_TOTAL: &str = "ariadne_duplicate_registrations_total";

/// Global metrics handle for rendering.
static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,

    /// Histogram buckets for handler duration, in seconds.
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            // 100µs to 5s
            duration_buckets: vec![
                0.0001, 0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
            ],
        }
    }
}

/// Installs the Prometheus recorder.
///
/// The exporter does not listen on its own; hosts expose
/// [`render_metrics`] from their own endpoint.
///
/// # Errors
///
/// - `TelemetryError::InvalidConfig` if the bucket list is empty.
/// - `TelemetryError::MetricsInit` if a recorder is already installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    if config.duration_buckets.is_empty() {
        return Err(TelemetryError::InvalidConfig(
            "duration_buckets must not be empty".to_string(),
        ));
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full(DURATION_SECONDS.to_string()),
            &config.duration_buckets,
        )
        .map_err(|e| TelemetryError::InvalidConfig(e.to_string()))?
        .install_recorder()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    let _ = METRICS_HANDLE.set(handle);
    register_metric_descriptions();

    Ok(())
}

/// Renders metrics in Prometheus text format.
///
/// Returns `None` if metrics are not initialized.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

fn register_metric_descriptions() {
    describe_counter!(
        INVOCATIONS_TOTAL,
        "Total middleware invocations by outcome"
    );
    describe_histogram!(
        DURATION_SECONDS,
        metrics::Unit::Seconds,
        "Middleware duration including downstream handlers"
    );
    describe_counter!(
        DUPLICATES_TOTAL,
        "Middleware registrations ignored as duplicates"
    );
}

/// Records one handler invocation.
pub fn record_invocation(middleware: &str, success: bool, duration: Duration) {
    let outcome = if success { "ok" } else { "error" };

    counter!(
        INVOCATIONS_TOTAL,
        "middleware" => middleware.to_string(),
        "outcome" => outcome
    )
    .increment(1);

    histogram!(DURATION_SECONDS, "middleware" => middleware.to_string())
        .record(duration.as_secs_f64());
}

/// Records a registration that was ignored as a duplicate.
pub fn record_duplicate(category: Category) {
    counter!(DUPLICATES_TOTAL, "category" => category.as_str()).increment(1);
}

/// Decorator that measures a handler.
///
/// The name, params and chain position of the wrapped handler are
/// unchanged.
pub struct Instrumented<C> {
    inner: BoxedMiddleware<C>,
}

impl<C> Instrumented<C> {
    /// Wraps `inner`.
    #[must_use]
    pub fn new(inner: BoxedMiddleware<C>) -> Self {
        Self { inner }
    }

    /// Returns the wrapped handler.
    #[must_use]
    pub fn inner(&self) -> &BoxedMiddleware<C> {
        &self.inner
    }
}

impl<C: Send + 'static> Middleware<C> for Instrumented<C> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn handle<'a>(
        &'a self,
        ctx: &'a mut C,
        next: Next<'a, C>,
        params: &'a [String],
    ) -> BoxFuture<'a, MiddlewareResult<()>> {
        Box::pin(async move {
            let started = Instant::now();
            let result = self.inner.handle(ctx, next, params).await;
            record_invocation(self.inner.name(), result.is_ok(), started.elapsed());
            result
        })
    }
}

impl<C: 'static> fmt::Debug for Instrumented<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instrumented")
            .field("middleware", &self.inner.name())
            .finish()
    }
}

/// Wraps a handler so every invocation is measured.
pub fn instrument<C: Send + 'static>(handler: BoxedMiddleware<C>) -> BoxedMiddleware<C> {
    Arc::new(Instrumented::new(handler))
}

/// Sink that counts duplicate warnings and forwards them.
#[derive(Clone, Default)]
pub struct MetricsWarningSink {
    inner: Option<SharedWarningSink>,
}

impl MetricsWarningSink {
    /// Creates a sink that only counts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink that counts and then forwards to `inner`.
    #[must_use]
    pub fn wrapping<W: WarningSink>(inner: W) -> Self {
        Self {
            inner: Some(Arc::new(inner)),
        }
    }
}

impl WarningSink for MetricsWarningSink {
    fn emit(&self, message: &str) {
        if let Some(inner) = &self.inner {
            inner.emit(message);
        }
    }

    fn emit_duplicate(&self, category: Category, name: &str, message: &str) {
        record_duplicate(category);
        if let Some(inner) = &self.inner {
            inner.emit_duplicate(category, name, message);
        }
    }
}

impl fmt::Debug for MetricsWarningSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricsWarningSink")
            .field("forwards", &self.inner.is_some())
            .finish()
    }
}
