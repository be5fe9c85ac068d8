//! Spec compiler.
//!
//! Turns use-time specs into ordered [`MiddlewareEntry`] lists, resolving
//! aliases against the registry's named middleware.
//!
//! ```text
//! "auth"          → named["auth"] with params []
//! "auth:jwt"      → named["auth"] with params ["jwt"]
//! "throttle:10,m" → named["throttle"] with params ["10", "m"]
//! <handler>       → the handler itself with params []
//! ```
//!
//! Params travel with the use-time spec, never with the registration.

use crate::entry::{MiddlewareEntry, MiddlewareSpec};
use crate::error::{MiddlewareError, MiddlewareResult};
use crate::registry::Registry;

/// A use-time spec string split into alias and inline params.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSpec<'a> {
    /// The alias to look up.
    pub name: &'a str,
    /// Inline params, in order.
    pub params: Vec<String>,
}

/// Splits `"<name>"` or `"<name>:<p1>,<p2>"` into its parts.
///
/// Only the first colon separates the name. An empty param segment
/// (`"auth:"`) yields no params; empty segments between commas are kept.
///
/// # Example
///
/// ```
/// use ariadne_core::parse_spec;
///
/// let parsed = parse_spec("throttle:10,minute");
/// assert_eq!(parsed.name, "throttle");
/// assert_eq!(parsed.params, vec!["10", "minute"]);
///
/// assert!(parse_spec("auth:").params.is_empty());
/// ```
#[must_use]
pub fn parse_spec(spec: &str) -> ParsedSpec<'_> {
    match spec.split_once(':') {
        Some((name, "")) => ParsedSpec {
            name,
            params: Vec::new(),
        },
        Some((name, params)) => ParsedSpec {
            name,
            params: params.split(',').map(str::to_string).collect(),
        },
        None => ParsedSpec {
            name: spec,
            params: Vec::new(),
        },
    }
}

/// Compiles use-time specs against `registry`.
pub(crate) fn compile_named<C, I, S>(
    registry: &Registry<C>,
    specs: I,
) -> MiddlewareResult<Vec<MiddlewareEntry<C>>>
where
    I: IntoIterator<Item = S>,
    S: Into<MiddlewareSpec<C>>,
{
    specs
        .into_iter()
        .map(|spec| compile_one(registry, spec.into()))
        .collect()
}

/// Compiles a JSON array of use-time spec strings.
pub(crate) fn compile_named_value<C>(
    registry: &Registry<C>,
    specs: &serde_json::Value,
) -> MiddlewareResult<Vec<MiddlewareEntry<C>>> {
    let serde_json::Value::Array(items) = specs else {
        return Err(MiddlewareError::input_type(
            "compile_named",
            "an array of middleware",
            crate::error::json_kind(specs),
        ));
    };

    items
        .iter()
        .map(|item| match item {
            serde_json::Value::String(spec) => compile_reference(registry, spec),
            _ => Err(MiddlewareError::InvalidType),
        })
        .collect()
}

fn compile_one<C>(
    registry: &Registry<C>,
    spec: MiddlewareSpec<C>,
) -> MiddlewareResult<MiddlewareEntry<C>> {
    match spec {
        MiddlewareSpec::Handler(handler) => Ok(MiddlewareEntry::callable(handler)),
        MiddlewareSpec::Reference(reference) => compile_reference(registry, &reference),
    }
}

fn compile_reference<C>(
    registry: &Registry<C>,
    reference: &str,
) -> MiddlewareResult<MiddlewareEntry<C>> {
    let ParsedSpec { name, params } = parse_spec(reference);
    let registered = registry
        .get_named(name)
        .ok_or_else(|| MiddlewareError::missing_named(name))?;
    Ok(registered.with_params(params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::{middleware_fn, BoxedMiddleware};
    use proptest::prelude::*;
    use serde_json::json;

    fn passthrough(name: &'static str) -> BoxedMiddleware<()> {
        middleware_fn(name, |ctx: &mut (), next, _params| {
            Box::pin(async move { next.run(ctx).await })
        })
    }

    fn registry_with_auth() -> Registry<()> {
        let mut registry = Registry::new();
        registry.insert_named(
            "auth".to_string(),
            MiddlewareEntry::namespace("App/Middleware/Auth.handle"),
        );
        registry
    }

    #[test]
    fn test_parse_bare_name() {
        let parsed = parse_spec("auth");
        assert_eq!(parsed.name, "auth");
        assert!(parsed.params.is_empty());
    }

    #[test]
    fn test_parse_params() {
        let parsed = parse_spec("auth:jwt,session");
        assert_eq!(parsed.name, "auth");
        assert_eq!(parsed.params, vec!["jwt", "session"]);
    }

    #[test]
    fn test_parse_empty_param_segment() {
        assert!(parse_spec("auth:").params.is_empty());
        assert_eq!(parse_spec("auth:a,,b").params, vec!["a", "", "b"]);
    }

    #[test]
    fn test_parse_splits_on_first_colon_only() {
        let parsed = parse_spec("proxy:http://upstream");
        assert_eq!(parsed.name, "proxy");
        assert_eq!(parsed.params, vec!["http://upstream"]);
    }

    #[test]
    fn test_compile_named_without_params() {
        let registry = registry_with_auth();
        let compiled = compile_named(&registry, ["auth"]).unwrap();

        assert_eq!(compiled, vec![registry.get_named("auth").unwrap().clone()]);
        assert!(compiled[0].params().is_empty());
    }

    #[test]
    fn test_compile_named_with_params() {
        let registry = registry_with_auth();
        let compiled = compile_named(&registry, ["auth:jwt"]).unwrap();

        assert_eq!(
            compiled[0].handler().namespace(),
            Some("App/Middleware/Auth.handle")
        );
        assert_eq!(compiled[0].params(), ["jwt"]);
        // the registration itself is untouched
        assert!(registry.get_named("auth").unwrap().params().is_empty());
    }

    #[test]
    fn test_compile_raw_handler() {
        let registry: Registry<()> = Registry::new();
        let handler = passthrough("inline");
        let compiled = compile_named(&registry, [MiddlewareSpec::Handler(handler.clone())]).unwrap();

        assert_eq!(compiled, vec![MiddlewareEntry::callable(handler)]);
    }

    #[test]
    fn test_compile_preserves_order() {
        let mut registry = registry_with_auth();
        registry.insert_named("csrf".to_string(), MiddlewareEntry::namespace("Csrf.handle"));

        let compiled = compile_named(&registry, ["csrf", "auth:basic"]).unwrap();
        let namespaces: Vec<_> = compiled
            .iter()
            .filter_map(|e| e.handler().namespace())
            .collect();
        assert_eq!(namespaces, vec!["Csrf.handle", "App/Middleware/Auth.handle"]);
    }

    #[test]
    fn test_compile_missing_named() {
        let registry: Registry<()> = Registry::new();
        let err = compile_named(&registry, ["auth:jwt"]).unwrap_err();

        assert!(matches!(err, MiddlewareError::MissingNamed { ref name } if name == "auth"));
        assert!(err.to_string().contains("{auth}"));
    }

    #[test]
    fn test_compile_value_rejects_non_string_items() {
        let registry = registry_with_auth();
        let err = compile_named_value(&registry, &json!([{}])).unwrap_err();
        assert!(matches!(err, MiddlewareError::InvalidType));

        let err = compile_named_value(&registry, &json!(["auth", 42])).unwrap_err();
        assert!(matches!(err, MiddlewareError::InvalidType));
    }

    #[test]
    fn test_compile_value_rejects_non_array() {
        let registry = registry_with_auth();
        let err = compile_named_value(&registry, &json!("auth")).unwrap_err();
        assert!(matches!(err, MiddlewareError::InputType { received: "string", .. }));
    }

    #[test]
    fn test_compile_value_accepts_strings() {
        let registry = registry_with_auth();
        let compiled = compile_named_value(&registry, &json!(["auth:jwt"])).unwrap();
        assert_eq!(compiled[0].params(), ["jwt"]);
    }

    proptest! {
        #[test]
        fn prop_name_never_contains_colon(spec in ".*") {
            prop_assert!(!parse_spec(&spec).name.contains(':'));
        }

        #[test]
        fn prop_params_round_trip(
            name in "[a-zA-Z][a-zA-Z0-9_]*",
            params in proptest::collection::vec("[a-z0-9]+", 1..5),
        ) {
            let spec = format!("{name}:{}", params.join(","));
            let parsed = parse_spec(&spec);
            prop_assert_eq!(parsed.name, name.as_str());
            prop_assert_eq!(parsed.params, params);
        }
    }
}
