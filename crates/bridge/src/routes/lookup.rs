//! URL resolution route handlers.

use axum::{
    Json,
    extract::{Query, State},
};
use commerce_bridge_core::EntityKind;
use serde::Deserialize;
use serde_json::{Value, json};

use super::parse_param;
use crate::error::{AppError, Result};
use crate::services::lookup::lookup_body;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct LookupParams {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct StorefrontUrlParams {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub id: Option<String>,
}

/// Entity rendered at a storefront path, `{}` when nothing matches.
pub async fn resolve_url(
    State(state): State<AppState>,
    Query(params): Query<LookupParams>,
) -> Result<Json<Value>> {
    let lookup = state.lookup().resolve_url(&params.url).await?;
    Ok(Json(lookup_body(lookup.as_ref())))
}

/// Storefront path of an entity, `{"url": null}` when it has none.
pub async fn storefront_url(
    State(state): State<AppState>,
    Query(params): Query<StorefrontUrlParams>,
) -> Result<Json<Value>> {
    let id = parse_param::<i64>("id", params.id.as_deref())?
        .ok_or_else(|| AppError::BadRequest("Invalid value for 'id'".to_string()))?;
    let kind = EntityKind::from_param(&params.kind);

    let url = state.lookup().storefront_url(kind, id).await?;
    Ok(Json(json!({ "url": url })))
}
