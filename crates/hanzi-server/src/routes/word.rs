//! Word Routes - Character lookup
//!
//! HTTP handlers that delegate to LookupService.

use axum::{
    extract::{Query, State},
    http::{header, HeaderName, StatusCode},
    routing::get,
    Json, Router,
};
use hanzi::Glyph;

use super::error_response;
use crate::models::{CharacterResponse, WordQuery};
use crate::AppState;

const CACHE_CONTROL: &str = "public, max-age=3600";

/// Look up a character, generating it on first request
#[utoipa::path(
    get,
    path = "/api/word",
    params(WordQuery),
    responses(
        (status = 200, description = "Character record", body = CharacterResponse),
        (status = 400, description = "Missing or invalid character"),
        (status = 404, description = "Character could not be described"),
        (status = 500, description = "Store or model unavailable")
    ),
    tag = "Word"
)]
pub async fn get_word(
    State(state): State<AppState>,
    Query(query): Query<WordQuery>,
) -> Result<([(HeaderName, &'static str); 1], Json<CharacterResponse>), (StatusCode, String)> {
    let raw = query.character.ok_or((
        StatusCode::BAD_REQUEST,
        "Missing query parameter: character".to_string(),
    ))?;
    let glyph = Glyph::parse(&raw).map_err(error_response)?;

    let record = state.lookup.lookup(&glyph).await.map_err(error_response)?;

    Ok((
        [(header::CACHE_CONTROL, CACHE_CONTROL)],
        Json(CharacterResponse::from(record)),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/word", get(get_word))
}
