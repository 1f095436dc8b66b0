//! Shared error types for the services crate.

use thiserror::Error;

use api::ApiError;

/// Errors emitted by `AuthService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error(transparent)]
    Api(ApiError),
}

impl From<ApiError> for AuthError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Unauthorized => AuthError::InvalidCredentials,
            other => AuthError::Api(other),
        }
    }
}

/// Errors emitted by `CatalogService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("course not found")]
    CourseNotFound,
    #[error(transparent)]
    Api(ApiError),
}

impl From<ApiError> for CatalogError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::NotFound => CatalogError::CourseNotFound,
            other => CatalogError::Api(other),
        }
    }
}

/// Errors emitted by `ResourceService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResourceError {
    #[error(transparent)]
    Api(#[from] ApiError),
}
