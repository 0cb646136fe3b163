//! Core types for the commerce bridge.
//!
//! This module provides type-safe wrappers for the domain concepts shared by
//! the bridge's resource services and its HTTP surface.

pub mod catalog;
pub mod content;
pub mod id;
pub mod lookup;
pub mod page;

pub use catalog::{CategoryNode, CategoryRecord, CategorySummary, ProductRecord};
pub use content::{ContentPayload, ContentRecord, Localized};
pub use id::*;
pub use lookup::{EntityKind, LookupId, UrlLookup};
pub use page::PageResult;
