//! Route tables compiled from TOML, matched against synthetic requests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use traffic_router::config::{parse_config, ConfigError};
use traffic_router::routing::{
    PredicateError, PredicateRegistry, RouteError, Router, SeededRandom, TrafficSpec,
};

const CANARY: &str = r#"
    [[routes]]
    name = "checkout-b"
    path_prefix = "/checkout"
    backend_group = "checkout-v2"
    priority = 10
    predicates = [{ name = "Traffic", args = [0.3, "checkout-group", "B"] }]

    [[routes]]
    name = "checkout-a"
    path_prefix = "/checkout"
    backend_group = "checkout-v1"
"#;

fn seeded_registry(seed: u64) -> PredicateRegistry {
    let mut registry = PredicateRegistry::new();
    registry.register(TrafficSpec::new(Arc::new(SeededRandom::new(seed))));
    registry
}

fn checkout(cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri("/checkout/cart");
    if let Some(cookie) = cookie {
        builder = builder.header("Cookie", cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn compile(toml: &str, registry: &PredicateRegistry) -> Result<Router, RouteError> {
    let config = parse_config(toml).expect("valid config");
    Router::compile(&config.routes, registry)
}

#[test]
fn test_first_visit_split_tracks_chance() {
    let router = compile(CANARY, &seeded_registry(1)).unwrap();

    let n = 20_000;
    let canary = (0..n)
        .filter(|_| router.match_request(&checkout(None)).unwrap().name == "checkout-b")
        .count();
    let rate = canary as f64 / n as f64;
    assert!((rate - 0.3).abs() < 0.02, "canary rate {}", rate);
}

#[test]
fn test_returning_clients_are_pinned() {
    let router = compile(CANARY, &seeded_registry(2)).unwrap();

    for _ in 0..1_000 {
        let b = router.match_request(&checkout(Some("checkout-group=B"))).unwrap();
        assert_eq!(b.backend_group, "checkout-v2");

        let a = router.match_request(&checkout(Some("checkout-group=A; other=B"))).unwrap();
        assert_eq!(a.backend_group, "checkout-v1");
    }
}

#[test]
fn test_invalid_traffic_args_fail_compilation() {
    let cases = [
        ("[]", PredicateError::Arity(0)),
        ("[0.3, \"onlyone\"]", PredicateError::Arity(2)),
        ("[0.3, \"c\", \"g\", \"x\"]", PredicateError::Arity(4)),
        ("[1.3]", PredicateError::Range(1.3)),
        ("[-0.3]", PredicateError::Range(-0.3)),
        ("[\"x\"]", PredicateError::Type { position: 0, expected: "a number" }),
        ("[0.3, 1, \"g\"]", PredicateError::Type { position: 1, expected: "a non-empty string" }),
        ("[0.3, \"c\", 2]", PredicateError::Type { position: 2, expected: "a non-empty string" }),
    ];

    for (args, expected) in cases {
        let toml = format!(
            "[[routes]]\nname = \"r\"\nbackend_group = \"g\"\npredicates = [{{ name = \"Traffic\", args = {} }}]\n",
            args
        );
        match compile(&toml, &PredicateRegistry::with_defaults()) {
            Err(RouteError::Predicate { route, source, .. }) => {
                assert_eq!(route, "r");
                assert_eq!(source, expected, "args {}", args);
            }
            Ok(_) => panic!("args {} should not compile", args),
        }
    }
}

#[test]
fn test_invalid_config_reports_every_problem() {
    let toml = r#"
        [listener]
        bind_address = "nowhere"

        [[routes]]
        name = "dup"
        backend_group = ""

        [[routes]]
        name = "dup"
        backend_group = "g"
    "#;
    match parse_config(toml) {
        Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 3),
        other => panic!("expected validation errors, got {:?}", other),
    }
}
