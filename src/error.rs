use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::{auth::Role, credentials::AuthError, token::TokenError};

/// FieldError
///
/// A single field-level validation failure. `field` uses the JSON (camelCase) name
/// of the offending request property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// ErrorResponse
///
/// JSON body returned for every rejected request that carries a body
/// (404 responses are empty).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

/// RepositoryError
///
/// Infrastructure failures raised by the persistence layer. Always fatal for the
/// current request; never retried.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("password hashing failed: {0}")]
    PasswordHash(String),
}

/// ApiError
///
/// The complete error taxonomy surfaced over HTTP. Handlers and middleware return
/// `Result<_, ApiError>` and let `IntoResponse` pick the status code and body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Username or Password is incorrect.")]
    InvalidCredentials,
    #[error("A valid bearer token is required.")]
    Unauthorized,
    #[error("The `{0}` role is required for this operation.")]
    Forbidden(Role),
    #[error("One or more validation errors occurred.")]
    Validation(Vec<FieldError>),
    #[error("Resource not found.")]
    NotFound,
    #[error("An internal server error occurred.")]
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidCredentials | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound => return StatusCode::NOT_FOUND.into_response(),
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = self.to_string();
        let errors = match self {
            ApiError::Validation(errors) => errors,
            _ => Vec::new(),
        };

        (status, Json(ErrorResponse { message, errors })).into_response()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        tracing::error!(error = %err, "repository operation failed");
        ApiError::Internal
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => ApiError::InvalidCredentials,
            AuthError::Repository(inner) => inner.into(),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(inner) => {
                tracing::error!(error = %inner, "token signing failed");
                ApiError::Internal
            }
            // Verification failures never reveal why the token was refused.
            _ => ApiError::Unauthorized,
        }
    }
}
