//! OpenAPI Documentation
//!
//! Centralized API documentation using utoipa.

use utoipa::OpenApi;

use crate::models::{CharacterResponse, PopularEntryResponse, PopularResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::word::get_word,
        super::popular::get_popular,
    ),
    info(
        title = "Hanzi API",
        version = "0.1.0",
        description = "Chinese character lookup.\n\nRecords missing from the store are generated by a language model on first request and cached.",
        license(name = "MIT"),
    ),
    servers(
        (url = "/", description = "Current server"),
    ),
    tags(
        (name = "Word", description = "Character lookup and popularity"),
    ),
    components(
        schemas(
            CharacterResponse,
            PopularEntryResponse,
            PopularResponse,
        )
    ),
)]
pub struct ApiDoc;
