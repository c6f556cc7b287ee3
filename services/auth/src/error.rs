//! Error type returned by the authentication handlers and middleware

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::warn;

/// Custom error type for authentication errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// No bearer token on a protected route
    #[error("No token, authorization denied")]
    MissingToken,

    /// Bearer token failed signature, expiry or subject checks
    #[error("Token is not valid")]
    InvalidToken,

    /// Unknown user or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Username or email already registered
    #[error("User already exists")]
    UserExists,

    /// Rejected signup input
    #[error("{0}")]
    Validation(String),

    /// Authenticated user no longer exists
    #[error("User not found")]
    NotFound,

    /// Internal server error
    #[error("Server error")]
    InternalServerError,
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingToken | AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::InvalidCredentials | AuthError::UserExists | AuthError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            AuthError::NotFound => StatusCode::NOT_FOUND,
            AuthError::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "message": self.to_string(),
        }));

        (self.status_code(), body).into_response()
    }
}

/// A body that is not JSON or misses a field is bad input like any other
impl From<JsonRejection> for AuthError {
    fn from(rejection: JsonRejection) -> Self {
        warn!("Rejected JSON body: {}", rejection.body_text());
        AuthError::Validation(rejection.body_text())
    }
}

/// Type alias for authentication results
pub type AuthResult<T> = Result<T, AuthError>;
