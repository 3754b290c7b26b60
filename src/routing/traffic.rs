//! Traffic-splitting predicate.
//!
//! # Responsibilities
//! - Validate the raw `Traffic(...)` argument list at route compile time
//! - Decide per request whether the route takes this request
//!
//! # Forms
//! ```text
//! Traffic(0.3)                      → 30% of requests, no stickiness
//! Traffic(0.3, "group-cookie", "B") → requests carrying group-cookie=B always match,
//!                                     requests with another value never match,
//!                                     requests without the cookie match 30% of the time
//! ```
//!
//! # Design Decisions
//! - Immutable after construction, shared freely across request tasks
//! - Randomness and cookie lookup are injected capabilities
//! - A present cookie always wins over the draw, even when it contradicts `chance`
//! - The cookie that pins a client to a group is set elsewhere; this only reads it

use serde_json::Value;

use crate::routing::cookie::CookieSource;
use crate::routing::random::RandomSource;

/// Errors raised while building a predicate from route configuration.
///
/// Never produced at request time.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredicateError {
    #[error("invalid argument count: got {0}, expected 1 or 3")]
    Arity(usize),

    #[error("argument {position} must be {expected}")]
    Type {
        position: usize,
        expected: &'static str,
    },

    #[error("chance {0} out of range, expected a value in [0, 1]")]
    Range(f64),

    #[error("unknown predicate: {0}")]
    UnknownPredicate(String),
}

/// Cookie name and group value that pin a client to this predicate's bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StickyGroup {
    cookie: String,
    group: String,
}

/// A compiled `Traffic` predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct TrafficPredicate {
    chance: f64,
    sticky: Option<StickyGroup>,
}

impl TrafficPredicate {
    /// Build a predicate from loosely typed arguments.
    ///
    /// Accepts `[chance]` or `[chance, cookie_name, group_name]`. Checks run in
    /// a fixed order (count, chance type, chance range, cookie, group) and the
    /// first failure is returned.
    pub fn create(args: &[Value]) -> Result<Self, PredicateError> {
        if args.len() != 1 && args.len() != 3 {
            return Err(PredicateError::Arity(args.len()));
        }

        let chance = args[0].as_f64().ok_or(PredicateError::Type {
            position: 0,
            expected: "a number",
        })?;
        if !(0.0..=1.0).contains(&chance) {
            return Err(PredicateError::Range(chance));
        }

        let sticky = match args {
            [_, cookie, group] => Some(StickyGroup {
                cookie: non_empty_string(cookie, 1)?,
                group: non_empty_string(group, 2)?,
            }),
            _ => None,
        };

        tracing::debug!(
            chance,
            traffic_group = sticky.as_ref().map(|s| s.group.as_str()),
            traffic_group_cookie = sticky.as_ref().map(|s| s.cookie.as_str()),
            "Traffic predicate created"
        );

        Ok(Self { chance, sticky })
    }

    /// Probability that a request without a group assignment matches.
    pub fn chance(&self) -> f64 {
        self.chance
    }

    /// Group this predicate represents, if stickiness is enabled.
    pub fn traffic_group(&self) -> Option<&str> {
        self.sticky.as_ref().map(|s| s.group.as_str())
    }

    /// Cookie carrying the client's assigned group, if stickiness is enabled.
    pub fn traffic_group_cookie(&self) -> Option<&str> {
        self.sticky.as_ref().map(|s| s.cookie.as_str())
    }

    pub fn is_sticky(&self) -> bool {
        self.sticky.is_some()
    }

    /// Decide whether a request matches.
    ///
    /// Total: a request without cookies takes the random branch.
    pub fn evaluate<C, R>(&self, cookies: &C, random: &R) -> bool
    where
        C: CookieSource + ?Sized,
        R: RandomSource + ?Sized,
    {
        if let Some(sticky) = &self.sticky {
            if let Some(value) = cookies.cookie(&sticky.cookie) {
                return value == sticky.group;
            }
        }
        random.next_f64() < self.chance
    }
}

fn non_empty_string(value: &Value, position: usize) -> Result<String, PredicateError> {
    match value.as_str() {
        Some(s) if !s.is_empty() => Ok(s.to_string()),
        _ => Err(PredicateError::Type {
            position,
            expected: "a non-empty string",
        }),
    }
}
