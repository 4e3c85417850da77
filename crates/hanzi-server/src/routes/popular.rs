//! Popular Routes - Visit ranking

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use super::error_response;
use crate::models::{PopularEntryResponse, PopularQuery, PopularResponse};
use crate::AppState;

/// Most visited characters
#[utoipa::path(
    get,
    path = "/api/popular",
    params(PopularQuery),
    responses(
        (status = 200, description = "Characters by visit count", body = PopularResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Word"
)]
pub async fn get_popular(
    State(state): State<AppState>,
    Query(query): Query<PopularQuery>,
) -> Result<Json<PopularResponse>, (StatusCode, String)> {
    let entries = state
        .lookup
        .popular(query.effective_limit())
        .await
        .map_err(error_response)?;

    Ok(Json(PopularResponse {
        characters: entries.into_iter().map(PopularEntryResponse::from).collect(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/popular", get(get_popular))
}
