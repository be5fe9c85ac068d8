//! The middleware engine.
//!
//! An [`Engine`] owns a [`Registry`] and exposes the registration and
//! composition operations. It is created once during bootstrap, populated
//! with `register_global` / `register_named` / `use_middleware`, and then
//! used to compose a [`Pipeline`] per request.
//!
//! # Example
//!
//! ```rust
//! use ariadne_core::{middleware_fn, Engine};
//!
//! # tokio_test::block_on(async {
//! let mut engine = Engine::<Vec<&'static str>>::new("handle").unwrap();
//!
//! engine.register_global([middleware_fn("cors", |ctx: &mut Vec<&'static str>, next, _params| {
//!     Box::pin(async move {
//!         ctx.push("cors");
//!         next.run(ctx).await
//!     })
//! })]);
//! engine.register_named([("auth", middleware_fn("auth", |ctx: &mut Vec<&'static str>, next, params| {
//!     Box::pin(async move {
//!         ctx.push(if params.is_empty() { "auth" } else { "auth:scheme" });
//!         next.run(ctx).await
//!     })
//! }))]);
//!
//! let ctx = engine
//!     .compose_global_and_named(["auth:jwt"])
//!     .unwrap()
//!     .params(Vec::new())
//!     .run()
//!     .await
//!     .unwrap();
//!
//! assert_eq!(ctx, vec!["cors", "auth:scheme"]);
//! # });
//! ```

use crate::compiler;
use crate::entry::{MiddlewareEntry, MiddlewareSpec};
use crate::error::{json_kind, MiddlewareError, MiddlewareResult};
use crate::locator::{Locator, NoopLocator};
use crate::pipeline::Pipeline;
use crate::registry::{Category, Registry};
use crate::sink::{SharedWarningSink, WarningSink, Warnings};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Conventional default method, used by configuration presets.
pub const DEFAULT_METHOD: &str = "handle";

/// Registers middleware and composes pipelines.
pub struct Engine<C> {
    registry: Registry<C>,
    default_method: String,
    locator: Arc<dyn Locator<C>>,
    warnings: Warnings,
}

impl<C: Send + 'static> Engine<C> {
    /// Creates an engine with the given default method and no locator or
    /// warning sink.
    ///
    /// # Errors
    ///
    /// Returns `MiddlewareError::Configuration` if `default_method` is empty.
    pub fn new(default_method: impl Into<String>) -> MiddlewareResult<Self> {
        Self::builder().default_method(default_method).build()
    }

    /// Creates a new engine builder.
    #[must_use]
    pub fn builder() -> EngineBuilder<C> {
        EngineBuilder::new()
    }

    /// Returns the default method used to expand bare namespaces.
    #[must_use]
    pub fn default_method(&self) -> &str {
        &self.default_method
    }

    /// Returns the registry.
    #[must_use]
    pub const fn registry(&self) -> &Registry<C> {
        &self.registry
    }

    /// Returns the global middleware in registration order.
    #[must_use]
    pub fn global(&self) -> &[MiddlewareEntry<C>] {
        self.registry.global()
    }

    /// Returns the named middleware.
    #[must_use]
    pub const fn named(&self) -> &IndexMap<String, MiddlewareEntry<C>> {
        self.registry.named()
    }

    /// Returns the server middleware in registration order.
    #[must_use]
    pub fn server(&self) -> &[MiddlewareEntry<C>] {
        self.registry.server()
    }

    /// Registers global middleware.
    ///
    /// Bare references are expanded to `<ref>.<default_method>`. Calls
    /// accumulate. A reference that is already registered is skipped with a
    /// warning.
    pub fn register_global<I, S>(&mut self, specs: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<MiddlewareSpec<C>>,
    {
        for spec in specs {
            let spec = spec.into();
            let entry = self.registration_entry(&spec);
            if self.registry.push_global(entry) {
                tracing::debug!(category = "global", middleware = %spec.display_name(), "registered middleware");
            } else {
                self.warn_duplicate(Category::Global, spec.display_name());
            }
        }
        self
    }

    /// Registers named middleware under their aliases.
    ///
    /// The first registration of an alias wins; later ones are skipped with
    /// a warning.
    pub fn register_named<I, K, S>(&mut self, specs: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: Into<MiddlewareSpec<C>>,
    {
        for (name, spec) in specs {
            let name = name.into();
            let entry = self.registration_entry(&spec.into());
            if self.registry.get_named(&name).is_some() {
                self.warn_duplicate(Category::Named, &name);
                continue;
            }
            tracing::debug!(category = "named", middleware = %name, "registered middleware");
            self.registry.insert_named(name, entry);
        }
        self
    }

    /// Registers server middleware. Same rules as [`Engine::register_global`].
    pub fn use_middleware<I, S>(&mut self, specs: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<MiddlewareSpec<C>>,
    {
        for spec in specs {
            let spec = spec.into();
            let entry = self.registration_entry(&spec);
            if self.registry.push_server(entry) {
                tracing::debug!(category = "server", middleware = %spec.display_name(), "registered middleware");
            } else {
                self.warn_duplicate(Category::Server, spec.display_name());
            }
        }
        self
    }

    /// Registers global middleware from a JSON array of namespace strings.
    ///
    /// # Errors
    ///
    /// - `InputType` if `specs` is not an array.
    /// - `InvalidType` if an item is not a string. Nothing is registered.
    pub fn register_global_value(&mut self, specs: &serde_json::Value) -> MiddlewareResult<&mut Self> {
        let references = string_items(specs, "register_global")?;
        Ok(self.register_global(references))
    }

    /// Registers named middleware from a JSON object of alias → namespace.
    ///
    /// # Errors
    ///
    /// - `InputType` if `specs` is not an object.
    /// - `InvalidType` if a value is not a string.
    pub fn register_named_value(&mut self, specs: &serde_json::Value) -> MiddlewareResult<&mut Self> {
        let serde_json::Value::Object(map) = specs else {
            return Err(MiddlewareError::input_type(
                "register_named",
                "a key/value pair of middleware",
                json_kind(specs),
            ));
        };

        let pairs = map
            .iter()
            .map(|(name, spec)| match spec {
                serde_json::Value::String(reference) => Ok((name.clone(), reference.clone())),
                _ => Err(MiddlewareError::InvalidType),
            })
            .collect::<MiddlewareResult<Vec<_>>>()?;

        Ok(self.register_named(pairs))
    }

    /// Registers server middleware from a JSON array of namespace strings.
    ///
    /// # Errors
    ///
    /// Same as [`Engine::register_global_value`].
    pub fn use_value(&mut self, specs: &serde_json::Value) -> MiddlewareResult<&mut Self> {
        let references = string_items(specs, "use_middleware")?;
        Ok(self.use_middleware(references))
    }

    /// Compiles use-time specs into entries, resolving aliases against the
    /// named middleware.
    ///
    /// # Errors
    ///
    /// Returns `MissingNamed` if an alias is not registered.
    pub fn compile_named<I, S>(&self, specs: I) -> MiddlewareResult<Vec<MiddlewareEntry<C>>>
    where
        I: IntoIterator<Item = S>,
        S: Into<MiddlewareSpec<C>>,
    {
        compiler::compile_named(&self.registry, specs)
    }

    /// Compiles a JSON array of use-time spec strings.
    ///
    /// # Errors
    ///
    /// `InputType` for a non-array, `InvalidType` for a non-string item,
    /// `MissingNamed` for an unknown alias.
    pub fn compile_named_value(
        &self,
        specs: &serde_json::Value,
    ) -> MiddlewareResult<Vec<MiddlewareEntry<C>>> {
        compiler::compile_named_value(&self.registry, specs)
    }

    /// Composes the server middleware into a pipeline.
    ///
    /// The pipeline holds a snapshot; later registrations do not affect it.
    #[must_use]
    pub fn compose_server(&self) -> Pipeline<C> {
        Pipeline::new(self.registry.server().to_vec(), Arc::clone(&self.locator))
    }

    /// Composes global middleware followed by the compiled named specs.
    ///
    /// Global middleware always runs first.
    ///
    /// # Errors
    ///
    /// Same as [`Engine::compile_named`].
    pub fn compose_global_and_named<I, S>(&self, specs: I) -> MiddlewareResult<Pipeline<C>>
    where
        I: IntoIterator<Item = S>,
        S: Into<MiddlewareSpec<C>>,
    {
        let named = self.compile_named(specs)?;
        Ok(self.global_then(named))
    }

    /// Same as [`Engine::compose_global_and_named`] for a JSON array of specs.
    ///
    /// # Errors
    ///
    /// Same as [`Engine::compile_named_value`].
    pub fn compose_global_and_named_value(
        &self,
        specs: &serde_json::Value,
    ) -> MiddlewareResult<Pipeline<C>> {
        let named = self.compile_named_value(specs)?;
        Ok(self.global_then(named))
    }

    fn global_then(&self, named: Vec<MiddlewareEntry<C>>) -> Pipeline<C> {
        let mut entries = Vec::with_capacity(self.registry.global().len() + named.len());
        entries.extend_from_slice(self.registry.global());
        entries.extend(named);
        Pipeline::new(entries, Arc::clone(&self.locator))
    }

    fn registration_entry(&self, spec: &MiddlewareSpec<C>) -> MiddlewareEntry<C> {
        match spec {
            MiddlewareSpec::Reference(reference) => {
                MiddlewareEntry::namespace(format!("{reference}.{}", self.default_method))
            }
            MiddlewareSpec::Handler(handler) => MiddlewareEntry::callable(Arc::clone(handler)),
        }
    }

    fn warn_duplicate(&self, category: Category, name: &str) {
        tracing::debug!(
            category = category.as_str(),
            middleware = %name,
            "duplicate middleware registration ignored"
        );
        self.warnings.emit_duplicate(category, name);
    }
}

fn string_items(specs: &serde_json::Value, method: &'static str) -> MiddlewareResult<Vec<String>> {
    let serde_json::Value::Array(items) = specs else {
        return Err(MiddlewareError::input_type(
            method,
            "an array of middleware",
            json_kind(specs),
        ));
    };

    items
        .iter()
        .map(|item| match item {
            serde_json::Value::String(reference) => Ok(reference.clone()),
            _ => Err(MiddlewareError::InvalidType),
        })
        .collect()
}

impl<C: 'static> fmt::Debug for Engine<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("default_method", &self.default_method)
            .field("registry", &self.registry)
            .field("warnings", &self.warnings)
            .finish_non_exhaustive()
    }
}

/// Builder for constructing an [`Engine`].
pub struct EngineBuilder<C> {
    default_method: Option<String>,
    locator: Option<Arc<dyn Locator<C>>>,
    sink: Option<SharedWarningSink>,
    warn_duplicates: bool,
}

impl<C: Send + 'static> EngineBuilder<C> {
    /// Creates a new builder with no default method set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            default_method: None,
            locator: None,
            sink: None,
            warn_duplicates: true,
        }
    }

    /// Sets the method appended to bare namespaces (`"foo"` → `"foo.handle"`).
    #[must_use]
    pub fn default_method(mut self, method: impl Into<String>) -> Self {
        self.default_method = Some(method.into());
        self
    }

    /// Sets the locator used to resolve namespaces at invocation time.
    #[must_use]
    pub fn locator<L: Locator<C>>(mut self, locator: L) -> Self {
        self.locator = Some(Arc::new(locator));
        self
    }

    /// Sets an already shared locator.
    #[must_use]
    pub fn shared_locator(mut self, locator: Arc<dyn Locator<C>>) -> Self {
        self.locator = Some(locator);
        self
    }

    /// Sets the sink that receives duplicate-registration warnings.
    #[must_use]
    pub fn warning_sink<W: WarningSink>(mut self, sink: W) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Sets an already shared warning sink.
    #[must_use]
    pub fn shared_warning_sink(mut self, sink: SharedWarningSink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Enables or disables forwarding duplicate warnings to the sink.
    #[must_use]
    pub fn warn_duplicates(mut self, enabled: bool) -> Self {
        self.warn_duplicates = enabled;
        self
    }

    /// Builds the engine.
    ///
    /// # Errors
    ///
    /// Returns `MiddlewareError::Configuration` if no default method was set,
    /// it is blank, or the locator expands its bindings with a different
    /// method.
    pub fn build(self) -> MiddlewareResult<Engine<C>> {
        let default_method = match self.default_method {
            Some(method) if !method.trim().is_empty() => method,
            _ => {
                return Err(MiddlewareError::configuration(
                    "make sure to define the middleware fn. Report issue to package author",
                ))
            }
        };

        if let Some(locator_method) = self.locator.as_ref().and_then(|l| l.default_method()) {
            if locator_method != default_method {
                return Err(MiddlewareError::configuration(format!(
                    "locator binds `{locator_method}` but the engine default method is `{default_method}`"
                )));
            }
        }

        Ok(Engine {
            registry: Registry::new(),
            default_method,
            locator: self.locator.unwrap_or_else(|| Arc::new(NoopLocator)),
            warnings: Warnings::new(self.sink, self.warn_duplicates),
        })
    }
}

impl<C: Send + 'static> Default for EngineBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for EngineBuilder<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineBuilder")
            .field("default_method", &self.default_method)
            .field("has_locator", &self.locator.is_some())
            .field("has_sink", &self.sink.is_some())
            .field("warn_duplicates", &self.warn_duplicates)
            .finish()
    }
}
