//! Content page route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use commerce_bridge_core::{ContentId, ContentPayload, parse_id_list};
use serde::Deserialize;
use serde_json::json;

use super::{non_empty, page_response, parse_param};
use crate::error::Result;
use crate::services::ContentQuery;
use crate::state::AppState;

/// Query parameters of the content listing.
#[derive(Debug, Default, Deserialize)]
pub struct ContentParams {
    pub q: Option<String>,
    pub page: Option<String>,
}

/// Language selector for localized labels and paths.
#[derive(Debug, Default, Deserialize)]
pub struct LangParams {
    pub lang: Option<String>,
}

impl LangParams {
    fn lang(&self) -> Option<&str> {
        self.lang.as_deref().filter(|lang| !lang.is_empty())
    }
}

/// One page of content pages, optionally filtered by name.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ContentParams>,
) -> Result<Response> {
    let query = ContentQuery {
        query: non_empty(params.q),
        page: parse_param("page", params.page.as_deref())?,
    };

    let page = state.content().list(query).await?;
    Ok(page_response(page))
}

/// Pages with the given comma-separated ids.
pub async fn by_ids(State(state): State<AppState>, Path(ids): Path<String>) -> Result<Response> {
    let ids: Vec<ContentId> = parse_id_list(&ids.split(',').collect::<Vec<_>>());
    let page = state.content().by_ids(&ids).await?;
    Ok(page_response(page))
}

/// Create a page; responds with its upstream id.
pub async fn create(
    State(state): State<AppState>,
    Query(params): Query<LangParams>,
    Json(payload): Json<ContentPayload>,
) -> Result<Response> {
    let id = state.content().create(&payload, params.lang()).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))).into_response())
}

/// Rename or move a page.
pub async fn update(
    State(state): State<AppState>,
    Path(content_id): Path<String>,
    Query(params): Query<LangParams>,
    Json(payload): Json<ContentPayload>,
) -> Result<StatusCode> {
    let id = ContentId::parse("contentId", &content_id)?;
    state.content().update(id, &payload, params.lang()).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn delete(
    State(state): State<AppState>,
    Path(content_id): Path<String>,
) -> Result<StatusCode> {
    let id = ContentId::parse("contentId", &content_id)?;
    state.content().delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
