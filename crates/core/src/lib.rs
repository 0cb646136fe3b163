//! Commerce Bridge Core - Shared types library.
//!
//! This crate provides the types exchanged between the bridge service and its
//! callers:
//! - catalog records (categories, products) and the derived category tree
//! - content page records
//! - paginated results and URL lookup results
//!
//! # Architecture
//!
//! The core crate contains only types and pure helpers - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, records, page results and lookup types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
