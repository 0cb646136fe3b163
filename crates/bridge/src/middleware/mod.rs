//! HTTP middleware stack for the bridge.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, added in `main`)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Basic auth (API routes only; `/health` stays open)

pub mod auth;
pub mod request_id;

pub use auth::basic_auth_middleware;
pub use request_id::request_id_middleware;
