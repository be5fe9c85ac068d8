//! Registration and composition from untyped JSON input.
//!
//! Hosts that load middleware lists from configuration go through the
//! `*_value` entry points, which validate shapes the typed API cannot.

use ariadne_core::{Engine, MiddlewareError};
use serde_json::json;

fn engine() -> Engine<()> {
    Engine::new("handle").unwrap()
}

#[test]
fn test_register_global_rejects_non_array() {
    let err = engine().register_global_value(&json!("foo")).err().unwrap();

    assert!(matches!(err, MiddlewareError::InputType { received: "string", .. }));
    assert_eq!(
        err.to_string(),
        "E_INVALID_PARAMETER: register_global accepts an array of middleware instead received string"
    );
}

#[test]
fn test_register_global_rejects_invalid_items() {
    let mut engine = engine();
    let err = engine.register_global_value(&json!([{}])).err().unwrap();

    assert!(matches!(err, MiddlewareError::InvalidType));
    assert_eq!(
        err.to_string(),
        "E_INVALID_MIDDLEWARE_TYPE: Middleware must be a function or reference to a resolvable string."
    );
    assert!(engine.global().is_empty());
}

#[test]
fn test_register_global_expands_namespaces() {
    let mut engine = engine();
    engine
        .register_global_value(&json!(["App/Middleware/BodyParser"]))
        .unwrap();

    assert_eq!(
        engine.global()[0].handler().namespace(),
        Some("App/Middleware/BodyParser.handle")
    );
}

#[test]
fn test_register_named_rejects_array() {
    let err = engine().register_named_value(&json!(["foo"])).err().unwrap();

    assert_eq!(
        err.to_string(),
        "E_INVALID_PARAMETER: register_named accepts a key/value pair of middleware instead received array"
    );
}

#[test]
fn test_register_named_rejects_invalid_values() {
    let err = engine()
        .register_named_value(&json!({ "auth": 42 }))
        .err()
        .unwrap();

    assert!(matches!(err, MiddlewareError::InvalidType));
}

#[test]
fn test_register_named_keeps_first() {
    let mut engine = engine();
    engine
        .register_named_value(&json!({ "auth": "App/Middleware/Auth" }))
        .unwrap();
    engine
        .register_named_value(&json!({ "auth": "App/Middleware/OtherAuth" }))
        .unwrap();

    assert_eq!(engine.named().len(), 1);
    assert_eq!(
        engine.named()["auth"].handler().namespace(),
        Some("App/Middleware/Auth.handle")
    );
}

#[test]
fn test_use_rejects_non_array() {
    let err = engine().use_value(&json!({})).err().unwrap();

    assert_eq!(
        err.to_string(),
        "E_INVALID_PARAMETER: use_middleware accepts an array of middleware instead received object"
    );
}

#[test]
fn test_use_dedupes_server_middleware() {
    let mut engine = engine();
    engine.use_value(&json!(["Cors", "Cors", "Static"])).unwrap();

    let namespaces: Vec<_> = engine
        .server()
        .iter()
        .filter_map(|entry| entry.handler().namespace())
        .collect();
    assert_eq!(namespaces, vec!["Cors.handle", "Static.handle"]);
}

#[test]
fn test_compose_value_reports_missing_named() {
    let mut engine = engine();
    engine.register_global_value(&json!(["Cors"])).unwrap();

    let err = engine
        .compose_global_and_named_value(&json!(["auth:jwt"]))
        .err()
        .unwrap();

    assert!(matches!(err, MiddlewareError::MissingNamed { ref name } if name == "auth"));
    assert_eq!(
        err.to_string(),
        "E_MISSING_NAMED_MIDDLEWARE: Cannot find any named middleware for {auth}. Make sure you have registered it."
    );
}

#[test]
fn test_compose_value_global_then_named() {
    let mut engine = engine();
    engine.register_global_value(&json!(["Cors"])).unwrap();
    engine
        .register_named_value(&json!({ "auth": "App/Middleware/Auth" }))
        .unwrap();

    let pipeline = engine
        .compose_global_and_named_value(&json!(["auth:jwt,session"]))
        .unwrap();

    assert_eq!(pipeline.names(), vec!["Cors.handle", "App/Middleware/Auth.handle"]);
    assert!(pipeline.entries()[0].params().is_empty());
    assert_eq!(pipeline.entries()[1].params(), ["jwt", "session"]);
}

#[test]
fn test_blank_default_method_is_rejected() {
    let err = Engine::<()>::new("").err().unwrap();
    assert!(matches!(err, MiddlewareError::Configuration { .. }));
    assert!(err.to_string().starts_with("E_INVALID_CONFIGURATION"));
}
