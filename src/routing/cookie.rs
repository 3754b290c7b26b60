//! Read-only cookie lookup.
//!
//! Predicates only need "value of cookie `name`, if present", so they depend
//! on [`CookieSource`] instead of a concrete request type.

use std::collections::HashMap;

use axum::http::{header, HeaderMap, Request};

/// Lookup of a named cookie on an inbound request.
pub trait CookieSource {
    /// Returns the value of the first cookie called `name`, or `None` when absent.
    fn cookie(&self, name: &str) -> Option<&str>;
}

impl CookieSource for HeaderMap {
    fn cookie(&self, name: &str) -> Option<&str> {
        self.get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(|line| find_cookie(line, name))
    }
}

impl<B> CookieSource for Request<B> {
    fn cookie(&self, name: &str) -> Option<&str> {
        self.headers().cookie(name)
    }
}

impl CookieSource for HashMap<String, String> {
    fn cookie(&self, name: &str) -> Option<&str> {
        self.get(name).map(String::as_str)
    }
}

/// Scan one `Cookie` header line (`a=1; b=2`) for `name`.
fn find_cookie<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    line.split(';')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .find_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (key.trim() == name).then(|| unquote(value.trim()))
        })
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}
