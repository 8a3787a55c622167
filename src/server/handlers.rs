use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::Html;
use serde::Deserialize;

use super::errors::ApiError;
use crate::pipeline::{FundingSearch, ModeChoice, SearchResponse};

const INDEX_HTML: &str = include_str!("static/index.html");

#[derive(Debug, Deserialize)]
pub(super) struct SearchParams {
    /// Free-text query, any language.
    q: Option<String>,
    /// `auto` (default), `fast` or `broad`.
    mode: Option<ModeChoice>,
}

pub(super) async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub(super) async fn health() -> &'static str {
    "OK"
}

pub(super) async fn search<P: FundingSearch>(
    State(pipeline): State<Arc<P>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::InvalidParams(e.body_text()))?;
    let query = params.q.as_deref().map(str::trim).unwrap_or_default();
    if query.is_empty() {
        return Err(ApiError::EmptyQuery);
    }
    Ok(Json(pipeline.search(query, params.mode).await))
}
