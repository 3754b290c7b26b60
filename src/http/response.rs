//! Routing decision responses.
//!
//! # Responsibilities
//! - Report which route and backend group a request resolved to
//! - Map no-match to 404
//!
//! # Design Decisions
//! - Decision in both the JSON body and the `x-backend-group` header, so
//!   callers can read it without parsing the body
//! - The sticky group cookie is never set here

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::routing::CompiledRoute;

pub const X_BACKEND_GROUP: HeaderName = HeaderName::from_static("x-backend-group");

/// Body returned for a matched request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDecision {
    pub route: String,
    pub backend_group: String,
}

impl From<&CompiledRoute> for RouteDecision {
    fn from(route: &CompiledRoute) -> Self {
        Self {
            route: route.name.clone(),
            backend_group: route.backend_group.clone(),
        }
    }
}

impl IntoResponse for RouteDecision {
    fn into_response(self) -> Response {
        let header = HeaderValue::from_str(&self.backend_group).ok();
        let mut response = (StatusCode::OK, Json(self)).into_response();
        if let Some(value) = header {
            response.headers_mut().insert(X_BACKEND_GROUP, value);
        }
        response
    }
}

pub fn no_route() -> Response {
    (StatusCode::NOT_FOUND, "No matching route found").into_response()
}
