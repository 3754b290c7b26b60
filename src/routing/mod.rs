//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (host, path, cookies)
//!     → router.rs (route lookup)
//!     → matcher.rs (evaluate match conditions)
//!     → traffic.rs (traffic split / sticky group)
//!     → Return: matched Route or NoMatch
//!
//! Route Compilation (at startup and on reload):
//!     RouteConfig[]
//!     → registry.rs (named predicate → Matcher, arguments validated)
//!     → Sort by priority
//!     → Freeze as immutable Router
//! ```
//!
//! # Design Decisions
//! - Routes compiled up front, immutable at runtime
//! - Invalid predicate arguments fail compilation, never a request
//! - No regex in hot path (prefix matching only)
//! - First match wins (ordered by priority)

pub mod cookie;
pub mod matcher;
pub mod random;
pub mod registry;
pub mod router;
pub mod traffic;

pub use cookie::CookieSource;
pub use matcher::Matcher;
pub use random::{FixedRandom, RandomSource, SeededRandom, ThreadLocalRandom};
pub use registry::{PredicateRegistry, PredicateSpec, TrafficSpec};
pub use router::{CompiledRoute, RouteError, Router};
pub use traffic::{PredicateError, TrafficPredicate};
