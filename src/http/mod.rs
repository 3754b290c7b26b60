//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tracing layer)
//!     → routing::Router (current table, swapped on reload)
//!     → response.rs (route decision or 404)
//!     → Send to client
//! ```

pub mod response;
pub mod server;

pub use response::{RouteDecision, X_BACKEND_GROUP};
pub use server::{HttpServer, RouterHandle};
