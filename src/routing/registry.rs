//! Named predicate specs.
//!
//! Route configuration refers to predicates by name (`Traffic`) with a raw
//! argument list. The registry turns that pair into a [`Matcher`] once, at
//! route compile time.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::routing::matcher::{Matcher, TrafficMatcher};
use crate::routing::random::{RandomSource, ThreadLocalRandom};
use crate::routing::traffic::{PredicateError, TrafficPredicate};

/// Factory for one kind of predicate.
pub trait PredicateSpec: Send + Sync {
    /// Name used in route configuration.
    fn name(&self) -> &str;

    /// Validate `args` and build the matcher.
    fn create(&self, args: &[Value]) -> Result<Box<dyn Matcher>, PredicateError>;
}

/// Spec for `Traffic(chance[, cookie, group])`.
#[derive(Debug, Clone)]
pub struct TrafficSpec {
    random: Arc<dyn RandomSource>,
}

impl TrafficSpec {
    pub const NAME: &'static str = "Traffic";

    pub fn new(random: Arc<dyn RandomSource>) -> Self {
        Self { random }
    }
}

impl Default for TrafficSpec {
    fn default() -> Self {
        Self::new(Arc::new(ThreadLocalRandom))
    }
}

impl PredicateSpec for TrafficSpec {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn create(&self, args: &[Value]) -> Result<Box<dyn Matcher>, PredicateError> {
        let predicate = TrafficPredicate::create(args)?;
        Ok(Box::new(TrafficMatcher::new(predicate, self.random.clone())))
    }
}

/// Lookup table of predicate specs by name.
#[derive(Default)]
pub struct PredicateRegistry {
    specs: HashMap<String, Box<dyn PredicateSpec>>,
}

impl PredicateRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in predicates.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(TrafficSpec::default());
        registry
    }

    /// Add a spec, replacing any spec already registered under the same name.
    pub fn register(&mut self, spec: impl PredicateSpec + 'static) {
        self.specs.insert(spec.name().to_string(), Box::new(spec));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.specs.contains_key(name)
    }

    /// Build a matcher for the named predicate.
    pub fn create(&self, name: &str, args: &[Value]) -> Result<Box<dyn Matcher>, PredicateError> {
        let spec = self
            .specs
            .get(name)
            .ok_or_else(|| PredicateError::UnknownPredicate(name.to_string()))?;
        spec.create(args)
    }
}

impl std::fmt::Debug for PredicateRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.specs.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::random::FixedRandom;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::json;

    #[test]
    fn test_defaults_include_traffic() {
        let registry = PredicateRegistry::with_defaults();
        assert!(registry.contains("Traffic"));
        assert!(registry.create("Traffic", &[json!(0.5)]).is_ok());
    }

    #[test]
    fn test_unknown_predicate() {
        let registry = PredicateRegistry::with_defaults();
        let err = registry.create("traffic", &[json!(0.5)]).unwrap_err();
        assert_eq!(err, PredicateError::UnknownPredicate("traffic".into()));
    }

    #[test]
    fn test_errors_pass_through() {
        let registry = PredicateRegistry::with_defaults();
        let err = registry.create("Traffic", &[json!(0.3), json!("onlyone")]).unwrap_err();
        assert_eq!(err, PredicateError::Arity(2));
    }

    #[test]
    fn test_register_replaces_random_source() {
        let mut registry = PredicateRegistry::new();
        registry.register(TrafficSpec::new(Arc::new(FixedRandom(0.1))));
        let matcher = registry.create("Traffic", &[json!(0.2)]).unwrap();
        assert!(matcher.matches(&Request::builder().body(Body::empty()).unwrap()));

        registry.register(TrafficSpec::new(Arc::new(FixedRandom(0.3))));
        let matcher = registry.create("Traffic", &[json!(0.2)]).unwrap();
        assert!(!matcher.matches(&Request::builder().body(Body::empty()).unwrap()));
    }
}
