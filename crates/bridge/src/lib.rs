//! Commerce Bridge - adapter between a content host and a commerce platform.
//!
//! The bridge exposes the platform's categories, products and content pages
//! in the uniform shape the bridge host expects, resolves storefront URLs in
//! both directions, and writes content pages on the host's behalf.
//!
//! # Architecture
//!
//! - [`upstream`] - REST and GraphQL transport with storefront token handling
//! - [`services`] - per-resource operations over a [`upstream::Transport`]
//! - [`cache`] - lazily populated URL resolution caches
//! - [`routes`] - axum handlers and the application router
//!
//! The binary in `main.rs` wires configuration, Sentry and tracing around
//! [`routes::router`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cache;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod upstream;
pub mod validation;

pub use config::BridgeConfig;
pub use error::AppError;
pub use state::AppState;
