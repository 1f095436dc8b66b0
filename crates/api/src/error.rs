//! Shared error taxonomy for backend calls.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors surfaced by gateway implementations.
///
/// `NotFound` on a progress fetch means "no prior progress" and is treated as
/// zero state by callers, not shown to the user. `Unauthorized` is surfaced
/// by the enclosing page; the watch session itself treats every variant as
/// fail-soft.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("not found")]
    NotFound,

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("server error: {0}")]
    Server(StatusCode),

    #[error("unexpected status: {0}")]
    UnexpectedStatus(StatusCode),

    #[error("unexpected payload: {0}")]
    UnexpectedPayload(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl ApiError {
    /// Maps a non-success HTTP status to the taxonomy.
    #[must_use]
    pub fn from_status(status: StatusCode, detail: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
            StatusCode::NOT_FOUND => ApiError::NotFound,
            StatusCode::UNPROCESSABLE_ENTITY | StatusCode::BAD_REQUEST => {
                ApiError::Validation(detail)
            }
            status if status.is_server_error() => ApiError::Server(status),
            status => ApiError::UnexpectedStatus(status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_statuses_to_taxonomy() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, String::new()),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, String::new()),
            ApiError::NotFound
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::UNPROCESSABLE_ENTITY, "bad".into()),
            ApiError::Validation(detail) if detail == "bad"
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::INTERNAL_SERVER_ERROR, String::new()),
            ApiError::Server(StatusCode::INTERNAL_SERVER_ERROR)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::IM_A_TEAPOT, String::new()),
            ApiError::UnexpectedStatus(_)
        ));
    }
}
