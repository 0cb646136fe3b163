//! Product route handlers.

use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use commerce_bridge_core::{CategoryId, ProductId, parse_id_list};
use serde::Deserialize;

use super::{non_empty, page_response, parse_param};
use crate::error::Result;
use crate::services::ProductQuery;
use crate::state::AppState;

/// Query parameters of the product listing.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductParams {
    pub category_id: Option<String>,
    pub keyword: Option<String>,
    pub page: Option<String>,
}

/// One page of products, optionally filtered by category and keyword.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ProductParams>,
) -> Result<Response> {
    let query = ProductQuery {
        category_id: parse_param::<i64>("categoryId", params.category_id.as_deref())?
            .map(CategoryId::new),
        keyword: non_empty(params.keyword),
        page: parse_param("page", params.page.as_deref())?,
    };

    let page = state.products().list(query).await?;
    Ok(page_response(page))
}

/// Products with the given comma-separated ids.
pub async fn by_ids(State(state): State<AppState>, Path(ids): Path<String>) -> Result<Response> {
    let ids: Vec<ProductId> = parse_id_list(&ids.split(',').collect::<Vec<_>>());
    let page = state.products().by_ids(&ids).await?;
    Ok(page_response(page))
}
