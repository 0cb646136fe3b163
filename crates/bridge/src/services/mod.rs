//! Resource services.
//!
//! Each service owns its upstream access pattern and, where URLs are
//! resolved from a full listing, its resolution cache. Services are generic
//! over [`Transport`](crate::upstream::Transport) so they can be exercised
//! against an in-memory upstream.

pub mod categories;
pub mod category_tree;
pub mod content;
pub mod lookup;
pub mod products;

pub use categories::{CategoryQuery, CategoryService};
pub use content::{ContentError, ContentQuery, ContentService};
pub use lookup::LookupService;
pub use products::{ProductQuery, ProductService};
