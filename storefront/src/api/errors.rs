use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use thiserror::Error;

use crate::api::types::FailureResponse;
use crate::catalog::CatalogError;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("failed to parse request: {0}")]
    RequestParsingError(#[from] serde_json::Error),
    #[error("No authentication credentials provided")]
    NoAuthenticationProvided,
    #[error("Authentication credentials are invalid")]
    InvalidCredentials,
    #[error("failed to encrypt overrides: {0}")]
    OverrideEncryptionError(String),
    #[error("catalog unavailable: {0}")]
    CatalogUnavailable(#[from] Arc<CatalogError>),
    #[error("cache error: {0}")]
    CacheError(#[from] moka::PredicateError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StoreError {
    pub fn status(&self) -> StatusCode {
        match self {
            StoreError::BadRequest(_) | StoreError::RequestParsingError(_) => {
                StatusCode::BAD_REQUEST
            }
            StoreError::NoAuthenticationProvided | StoreError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            StoreError::CatalogUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            StoreError::OverrideEncryptionError(_)
            | StoreError::CacheError(_)
            | StoreError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            StoreError::BadRequest(msg) => msg,
            StoreError::RequestParsingError(_) => "Invalid JSON payload.".to_string(),
            StoreError::NoAuthenticationProvided => {
                "No authentication credentials provided. Send the flags secret as a bearer token.".to_string()
            }
            StoreError::InvalidCredentials => "The provided credentials are invalid.".to_string(),
            StoreError::CatalogUnavailable(err) => {
                tracing::error!("Catalog unavailable: {}", err);
                "The product catalog is currently unavailable. Please try again later.".to_string()
            }
            StoreError::OverrideEncryptionError(msg) => {
                tracing::error!("Failed to encrypt overrides: {}", msg);
                "Could not store flag overrides.".to_string()
            }
            StoreError::CacheError(err) => {
                tracing::error!("Cache invalidation failed: {}", err);
                "Revalidation failed. Please try again later.".to_string()
            }
            StoreError::Internal(msg) => {
                tracing::error!("Internal server error: {}", msg);
                "An internal server error occurred. Please try again later.".to_string()
            }
        };

        (
            status,
            Json(FailureResponse {
                success: false,
                message,
            }),
        )
            .into_response()
    }
}
