//! HTTP route handlers for the bridge.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                 - Liveness check (never authenticated)
//!
//! # Categories
//! GET    /categories             - Flat listing (?parentId&keyword&lang&page)
//! GET    /categories/tree        - Nested tree (?parentId&lang)
//! GET    /categories/ids/{ids}   - Categories by comma-separated ids
//!
//! # Content
//! GET    /content                - Listing (?q&lang&page)
//! GET    /content/ids/{ids}      - Pages by comma-separated ids
//! POST   /content                - Create a page (?lang)
//! PUT    /content/{contentId}    - Update a page (?lang)
//! DELETE /content/{contentId}    - Delete a page
//!
//! # Products
//! GET    /products               - Listing (?categoryId&keyword&lang&page)
//! GET    /products/ids/{ids}     - Products by comma-separated ids
//!
//! # URLs
//! GET    /lookup-url             - Entity rendered at a storefront path (?url)
//! GET    /storefront-url         - Storefront path of an entity (?type&id&lang)
//! ```
//!
//! Listings respond with the item array and report paging through the
//! `x-total` and `x-hasnext` headers.

pub mod categories;
pub mod content;
pub mod lookup;
pub mod products;

use std::str::FromStr;

use axum::{
    Json, Router,
    http::{HeaderName, HeaderValue},
    middleware::from_fn,
    middleware::from_fn_with_state,
    response::{IntoResponse, Response},
    routing::{get, put},
};
use commerce_bridge_core::PageResult;
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::error::{AppError, Result};
use crate::middleware::{basic_auth_middleware, request_id_middleware};
use crate::state::AppState;

/// Total number of items matching a listing.
pub const TOTAL_HEADER: HeaderName = HeaderName::from_static("x-total");
/// Whether a further page exists.
pub const HAS_NEXT_HEADER: HeaderName = HeaderName::from_static("x-hasnext");

/// Build the complete application router.
///
/// # Middleware Order (outermost first)
///
/// 1. `TraceLayer` (request tracing)
/// 2. Request ID (add unique ID to each request)
/// 3. Basic auth (API routes only)
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/categories", get(categories::list))
        .route("/categories/tree", get(categories::tree))
        .route("/categories/ids/{ids}", get(categories::by_ids))
        .route("/content", get(content::list).post(content::create))
        .route("/content/ids/{ids}", get(content::by_ids))
        .route(
            "/content/{content_id}",
            put(content::update).delete(content::delete),
        )
        .route("/products", get(products::list))
        .route("/products/ids/{ids}", get(products::by_ids))
        .route("/lookup-url", get(lookup::resolve_url))
        .route("/storefront-url", get(lookup::storefront_url))
        .layer(from_fn_with_state(state.clone(), basic_auth_middleware));

    Router::new()
        .route("/health", get(health))
        .merge(api)
        .with_state(state)
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the upstream.
async fn health() -> &'static str {
    "ok"
}

/// Item array with the paging headers.
pub fn page_response<T: Serialize>(page: PageResult<T>) -> Response {
    let mut response = Json(page.items).into_response();
    let headers = response.headers_mut();
    headers.insert(TOTAL_HEADER, HeaderValue::from(page.total));
    headers.insert(
        HAS_NEXT_HEADER,
        HeaderValue::from_static(if page.has_next { "true" } else { "false" }),
    );
    response
}

/// Parse an optional numeric query parameter.
///
/// Absent and empty values are `None`.
///
/// # Errors
///
/// Returns `AppError::BadRequest` naming the parameter when the value does
/// not parse.
pub fn parse_param<T: FromStr>(name: &str, value: Option<&str>) -> Result<Option<T>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| AppError::BadRequest(format!("Invalid value for '{name}'"))),
    }
}

/// Treat an empty query string value as absent.
pub fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
