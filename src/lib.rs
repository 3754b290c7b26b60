//! Traffic-splitting route matcher.
//!
//! Compiles route tables whose routes may carry a `Traffic` predicate
//! (probabilistic split, optionally pinned by a group cookie) and resolves
//! requests against them.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{PredicateError, PredicateRegistry, Router, TrafficPredicate};
