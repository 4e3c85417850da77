//! Hanzi API Routes
//!
//! - /api/word - Character lookup (generated on first request)
//! - /api/popular - Most visited characters

pub mod popular;
pub mod swagger;
pub mod word;

use axum::http::StatusCode;
use hanzi::DomainError;

/// Map a domain error to a status code and message.
///
/// A generation failure caused by the model's answer means the glyph could
/// not be described (404); one caused by the transport is an infrastructure
/// failure (500).
pub fn error_response(error: DomainError) -> (StatusCode, String) {
    let status = match &error {
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::GenerationFailed { last_error, .. } if !last_error.is_transport() => {
            StatusCode::NOT_FOUND
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        tracing::error!("Request failed: {}", error);
    }

    (status, error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hanzi::BackfillError;
    use std::time::Duration;

    fn generation_failed(last_error: BackfillError) -> DomainError {
        DomainError::GenerationFailed {
            glyph: "我".to_string(),
            attempts: 3,
            last_error,
        }
    }

    #[test]
    fn test_status_mapping() {
        let status = |e| error_response(e).0;

        assert_eq!(
            status(DomainError::Validation("bad".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(DomainError::not_found("Character", "我")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(generation_failed(BackfillError::InvalidJson("eof".to_string()))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(generation_failed(BackfillError::Timeout(Duration::from_secs(30)))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status(generation_failed(BackfillError::Transport("refused".to_string()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status(DomainError::Unavailable("down".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
