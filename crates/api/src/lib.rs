//! HTTP API layer for encore.
//!
//! This crate provides the REST trigger surface of the release tracker:
//!
//! - **Endpoints**: artist and game follows, notification listing,
//!   manual trigger routes for the update and cleanup jobs
//! - **Extractors**: bearer-token authentication
//! - **Middleware**: auth lookup, logging, CORS
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::AppState;
