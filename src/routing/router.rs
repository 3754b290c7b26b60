//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Compile route configs into matchers
//! - Look up matching route for request
//! - Return matched route or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan in priority order (acceptable for typical route counts)
//! - Any invalid predicate rejects the whole table; no partial routers
//! - Explicit NoMatch rather than silent default

use axum::body::Body;
use axum::http::Request;

use crate::config::RouteConfig;
use crate::routing::matcher::{AndMatcher, HostMatcher, Matcher, PathPrefixMatcher};
use crate::routing::registry::PredicateRegistry;
use crate::routing::traffic::PredicateError;

/// Route compilation failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RouteError {
    #[error("route '{route}': predicate {predicate}: {source}")]
    Predicate {
        route: String,
        predicate: String,
        #[source]
        source: PredicateError,
    },
}

/// A route ready for request-time matching.
#[derive(Debug)]
pub struct CompiledRoute {
    pub name: String,
    pub backend_group: String,
    pub priority: u32,
    matcher: AndMatcher,
}

impl CompiledRoute {
    pub fn matches(&self, req: &Request<Body>) -> bool {
        self.matcher.matches(req)
    }
}

/// Immutable, priority-ordered route table.
#[derive(Debug, Default)]
pub struct Router {
    routes: Vec<CompiledRoute>,
}

impl Router {
    /// Compile routes using the predicates in `registry`.
    pub fn compile(routes: &[RouteConfig], registry: &PredicateRegistry) -> Result<Self, RouteError> {
        let mut compiled = routes
            .iter()
            .map(|route| compile_route(route, registry))
            .collect::<Result<Vec<_>, _>>()?;

        // Stable sort: equal priorities keep config order.
        compiled.sort_by(|a, b| b.priority.cmp(&a.priority));

        tracing::info!(routes = compiled.len(), "Routes compiled");
        Ok(Self { routes: compiled })
    }

    /// First route (by priority) whose conditions all match.
    pub fn match_request(&self, req: &Request<Body>) -> Option<&CompiledRoute> {
        self.routes.iter().find(|route| route.matches(req))
    }

    pub fn routes(&self) -> &[CompiledRoute] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

fn compile_route(route: &RouteConfig, registry: &PredicateRegistry) -> Result<CompiledRoute, RouteError> {
    let mut matchers: Vec<Box<dyn Matcher>> = Vec::new();

    if let Some(host) = &route.host {
        matchers.push(Box::new(HostMatcher::new(host.as_str())));
    }
    if let Some(prefix) = &route.path_prefix {
        matchers.push(Box::new(PathPrefixMatcher::new(prefix.as_str())));
    }
    for predicate in &route.predicates {
        let matcher = registry
            .create(&predicate.name, &predicate.args)
            .map_err(|source| {
                tracing::warn!(
                    route = %route.name,
                    predicate = %predicate.name,
                    error = %source,
                    "Rejecting route"
                );
                RouteError::Predicate {
                    route: route.name.clone(),
                    predicate: predicate.name.clone(),
                    source,
                }
            })?;
        matchers.push(matcher);
    }

    Ok(CompiledRoute {
        name: route.name.clone(),
        backend_group: route.backend_group.clone(),
        priority: route.priority,
        matcher: AndMatcher::new(matchers),
    })
}
