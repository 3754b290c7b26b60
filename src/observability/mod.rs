//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields (route, predicate, path)
//!
//! Consumers:
//!     → logging.rs subscriber (stdout)
//! ```
//!
//! # Design Decisions
//! - Structured fields rather than formatted strings
//! - Per-request decisions log at TRACE so the hot path stays quiet by default
//! - `RUST_LOG` overrides the configured level

pub mod logging;

pub use logging::init_logging;
