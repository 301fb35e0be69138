//! Trait expression scenarios
//!
//! End-to-end checks of the public API: text expression in, policy value out.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

use traitexpr_engine::{
    Engine, EngineConfig, Expr, ExprError, TraitMap, TraitResolver, TraitStore, Value,
};

fn list(items: &[&str]) -> Value {
    Value::list(items.iter().copied())
}

// ============================================================================
// TEMPLATE SCENARIOS
// ============================================================================

#[test]
fn test_environment_logins_from_groups() {
    let engine = Engine::new();
    let traits = TraitStore::new().with_trait("groups", ["env-staging", "env-qa", "devs"]);

    let result = engine
        .evaluate_expression(
            r#"transform(filter(external.groups, matches("^env-\\w+$")), replace("^env-(\\w+)$", "$1"))"#,
            &traits,
        )
        .unwrap();

    assert_eq!(result, list(&["staging", "qa"]));
}

#[test]
fn test_username_sanitised() {
    let engine = Engine::new();
    let traits = TraitStore::new().with_trait("username", ["my-username"]);

    let result = engine
        .evaluate_expression(r#"transform(external.username, replace("-", "_"))"#, &traits)
        .unwrap();

    assert_eq!(result, list(&["my_username"]));
}

#[test]
fn test_ifelse_on_missing_group() {
    let engine = Engine::new();
    let traits = TraitStore::new().with_trait("groups", ["devs"]);

    let result = engine
        .evaluate_expression(
            r#"ifelse(contains(external.groups, "contractors"), "first", "second")"#,
            &traits,
        )
        .unwrap();

    assert_eq!(result, Value::scalar("second"));
}

#[test]
fn test_match_falls_through_to_default() {
    let engine = Engine::new();
    let result = engine
        .evaluate_expression(
            r#"match("z", option("a", list("x")), default_option(list("default")))"#,
            &TraitStore::new(),
        )
        .unwrap();

    assert_eq!(result, list(&["default"]));
}

#[test]
fn test_match_selects_role_from_trait() {
    let engine = Engine::new();
    let src = r#"
match(
	external.team,
	option("platform", list("root", "admin")),
	option("support", "viewer"),
	default_option(list()),
)"#;

    let platform = TraitStore::new().with_trait("team", ["platform"]);
    let support = TraitStore::new().with_trait("team", ["support"]);
    let other = TraitStore::new().with_trait("team", ["sales"]);
    let absent = TraitStore::new().with_trait("username", ["alice"]);

    assert_eq!(engine.evaluate_expression(src, &platform).unwrap(), list(&["root", "admin"]));
    assert_eq!(engine.evaluate_expression(src, &support).unwrap(), Value::scalar("viewer"));
    assert_eq!(engine.evaluate_expression(src, &other).unwrap(), list(&[]));
    assert_eq!(engine.evaluate_expression(src, &absent).unwrap(), list(&[]));
}

#[test]
fn test_authorization_decision() {
    let engine = Engine::new();
    let src = r#"contains(external.groups, "devs") && !contains(external.groups, "contractors")"#;

    let dev = TraitStore::new().with_trait("groups", ["devs"]);
    let contractor = TraitStore::new().with_trait("groups", ["devs", "contractors"]);

    assert!(engine.check(src, &dev).unwrap());
    assert!(!engine.check(src, &contractor).unwrap());
    assert!(!engine.check(src, &TraitStore::new()).unwrap());
}

#[test]
fn test_traits_loaded_from_json() {
    let traits: TraitStore = serde_json::from_str(
        r#"{"username": "my-username", "email": ["nic@goteleport.com"]}"#,
    )
    .unwrap();

    let engine = Engine::new();
    let result = engine
        .evaluate_expression(
            r#"concat("ubuntu", transform(external.username, replace("-", "_")))"#,
            &traits,
        )
        .unwrap();

    assert_eq!(result, list(&["ubuntu", "my_username"]));
    assert_eq!(serde_json::to_string(&result).unwrap(), r#"["ubuntu","my_username"]"#);
}

// ============================================================================
// ERROR SCENARIOS
// ============================================================================

#[test]
fn test_errors_abort_evaluation() {
    let engine = Engine::new();
    let traits = TraitStore::new().with_trait("groups", ["devs"]);

    let cases = [
        (r#"filter(external.groups, matches("["))"#, "invalid pattern"),
        (r#"list(equals("a", "a"))"#, "invalid argument"),
        (r#"match("x", option(list("a", "b"), "y"))"#, "unsupported matcher"),
        (r#"match("x", option("y", "z"))"#, "no option matched"),
        (r#"user.groups"#, "not found"),
        (r#"ifelse("true", "a", "b")"#, "type mismatch"),
    ];

    for (src, expected) in cases {
        let err = engine.evaluate_expression(src, &traits).unwrap_err();
        assert!(
            err.to_string().contains(expected),
            "{} produced {:?}, expected {:?}",
            src,
            err.to_string(),
            expected
        );
    }
}

#[test]
fn test_evaluation_is_idempotent() {
    let engine = Engine::new();
    let traits = TraitStore::new().with_trait("groups", ["env-qa"]);
    let src = r#"transform(external.groups, replace("env-", ""))"#;

    let first = engine.evaluate_expression(src, &traits).unwrap();
    let second = engine.evaluate_expression(src, &traits).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_limits_from_config() {
    let engine = Engine::with_config(EngineConfig {
        max_depth: 3,
        ..Default::default()
    })
    .unwrap();

    assert!(matches!(
        engine.evaluate_expression(r#"list(list(list(list("a"))))"#, &TraitStore::new()),
        Err(ExprError::LimitExceeded { .. })
    ));

    let mut deep = Expr::lit("a");
    for _ in 0..5 {
        deep = Expr::call("list", vec![deep]);
    }
    assert!(matches!(
        engine.evaluate(&deep, &TraitStore::new()),
        Err(ExprError::LimitExceeded { .. })
    ));
}

// ============================================================================
// RESOLVER AND CONCURRENCY
// ============================================================================

/// Resolver backed by a plain map, as a caller's own trait source might be
struct DirectoryTraits(HashMap<String, Vec<String>>);

impl TraitResolver for DirectoryTraits {
    fn resolve(&self, name: &str) -> Vec<String> {
        self.0.get(name).cloned().unwrap_or_default()
    }

    fn resolve_all(&self) -> TraitMap {
        self.0.clone().into_iter().collect()
    }
}

#[test]
fn test_custom_resolver() {
    let mut map = HashMap::new();
    map.insert("logins".to_string(), vec!["alice".to_string(), "root".to_string()]);
    let traits = DirectoryTraits(map);

    let engine = Engine::new();
    assert_eq!(
        engine
            .evaluate_expression(r#"filter(external["logins"], matches("^a"))"#, &traits)
            .unwrap(),
        list(&["alice"])
    );
}

#[test]
fn test_concurrent_evaluations() {
    let engine = Arc::new(Engine::new());
    let shared = TraitStore::new().with_trait("groups", ["env-staging", "env-qa", "devs"]);
    let src = r#"transform(filter(external.groups, matches("^env-")), replace("^env-", ""))"#;

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let engine = Arc::clone(&engine);
            let shared = shared.clone();
            thread::spawn(move || {
                let own = TraitStore::new().with_trait("groups", [format!("env-user{}", i)]);
                let a = engine.evaluate_expression(src, &shared).unwrap();
                let b = engine.evaluate_expression(src, &own).unwrap();
                (a, b, i)
            })
        })
        .collect();

    for handle in handles {
        let (shared_result, own_result, i) = handle.join().unwrap();
        assert_eq!(shared_result, list(&["staging", "qa"]));
        assert_eq!(own_result, Value::list([format!("user{}", i)]));
    }

    assert_eq!(engine.cache_stats().entries, 1);
}
