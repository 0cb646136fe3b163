//! Category route handlers.

use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use commerce_bridge_core::{CategoryId, parse_id_list};
use serde::Deserialize;

use super::{non_empty, page_response, parse_param};
use crate::error::Result;
use crate::services::CategoryQuery;
use crate::state::AppState;

/// Query parameters of the category listing and tree.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryParams {
    pub parent_id: Option<String>,
    pub keyword: Option<String>,
    pub page: Option<String>,
}

impl CategoryParams {
    fn parent_id(&self) -> Result<Option<CategoryId>> {
        Ok(parse_param::<i64>("parentId", self.parent_id.as_deref())?.map(CategoryId::new))
    }
}

/// Flat, paginated category listing.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<CategoryParams>,
) -> Result<Response> {
    let query = CategoryQuery {
        parent_id: params.parent_id()?,
        page: parse_param("page", params.page.as_deref())?,
        keyword: non_empty(params.keyword),
    };

    let page = state.categories().list(query).await?;
    Ok(page_response(page))
}

/// Nested category tree below `parentId`.
pub async fn tree(
    State(state): State<AppState>,
    Query(params): Query<CategoryParams>,
) -> Result<Response> {
    let page = state.categories().tree(params.parent_id()?).await?;
    Ok(page_response(page))
}

/// Categories with the given comma-separated ids.
pub async fn by_ids(State(state): State<AppState>, Path(ids): Path<String>) -> Result<Response> {
    let ids: Vec<CategoryId> = parse_id_list(&ids.split(',').collect::<Vec<_>>());
    let page = state.categories().by_ids(&ids).await?;
    Ok(page_response(page))
}
