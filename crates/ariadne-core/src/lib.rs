//! # Ariadne Core
//!
//! Middleware registration and composition engine.
//!
//! A host application declares middleware in three categories and later
//! assembles an ordered chain from a request-specific subset of them:
//!
//! | Category | Registered with | Runs in |
//! |----------|-----------------|---------|
//! | Global   | [`Engine::register_global`] | every [`Engine::compose_global_and_named`] chain, first |
//! | Named    | [`Engine::register_named`]  | chains that select the alias, after global |
//! | Server   | [`Engine::use_middleware`]  | [`Engine::compose_server`] chains |
//!
//! ## Flow
//!
//! ```text
//! Registry ──► Compiler ──► Composer ──► Executor
//!  (engine)   "auth:jwt"     Pipeline     Next::run
//! ```
//!
//! - Middleware is either a handler ([`Middleware`] / [`middleware_fn`]) or a
//!   namespace string expanded with the engine's default method
//!   (`"App/Middleware/Auth"` → `"App/Middleware/Auth.handle"`).
//! - Namespaces are resolved through a [`Locator`] only when the executor
//!   reaches them.
//! - Each handler receives the shared context, a single-use [`Next`], and the
//!   inline params from its spec.
//! - Duplicate registrations are ignored and reported to a [`WarningSink`].
//!
//! ## Example
//!
//! ```
//! use ariadne_core::{middleware_fn, Engine, MapLocator};
//!
//! #[derive(Default)]
//! struct Ctx {
//!     user: Option<String>,
//! }
//!
//! # tokio_test::block_on(async {
//! let auth = middleware_fn("auth", |ctx: &mut Ctx, next, params| {
//!     Box::pin(async move {
//!         ctx.user = params.first().cloned();
//!         next.run(ctx).await
//!     })
//! });
//!
//! let mut engine = Engine::builder()
//!     .default_method("handle")
//!     .locator(MapLocator::new("handle").bind("App/Middleware/Auth", auth))
//!     .build()
//!     .unwrap();
//! engine.register_named([("auth", "App/Middleware/Auth")]);
//!
//! let ctx = engine
//!     .compose_global_and_named(["auth:jwt"])
//!     .unwrap()
//!     .params(Ctx::default())
//!     .run()
//!     .await
//!     .unwrap();
//!
//! assert_eq!(ctx.user.as_deref(), Some("jwt"));
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/ariadne-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod compiler;
mod engine;
mod entry;
mod error;
mod locator;
pub mod middleware;
mod pipeline;
mod registry;
mod sink;

pub use compiler::{parse_spec, ParsedSpec};
pub use engine::{Engine, EngineBuilder, DEFAULT_METHOD};
pub use entry::{HandlerRef, MiddlewareEntry, MiddlewareSpec};
pub use error::{MiddlewareError, MiddlewareResult};
pub use locator::{Locator, MapLocator, NoopLocator, ResolutionError};
pub use middleware::{middleware_fn, BoxFuture, BoxedMiddleware, FnMiddleware, Middleware, Next};
pub use pipeline::Pipeline;
pub use registry::{duplicate_warning, Category, Registry};
pub use sink::{SharedWarningSink, WarningSink};
