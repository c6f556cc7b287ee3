//! Middleware for JWT token validation and authentication

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use bson::oid::ObjectId;
use tracing::warn;

use crate::{error::AuthError, jwt::JwtService};

/// Authenticated user information
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub id: ObjectId,
    pub username: String,
}

/// Extract and validate the bearer token from the Authorization header
///
/// On success the caller is stored in the request extensions as an
/// [`AuthUser`]; otherwise the request is rejected with 401.
pub async fn auth_middleware(
    State(jwt_service): State<JwtService>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(AuthError::MissingToken)?;

    let claims = jwt_service.validate_token(bearer.token()).map_err(|e| {
        warn!("Failed to validate token: {}", e);
        AuthError::InvalidToken
    })?;

    let id = ObjectId::parse_str(&claims.sub).map_err(|e| {
        warn!("Token subject is not a user id: {}", e);
        AuthError::InvalidToken
    })?;

    req.extensions_mut().insert(AuthUser {
        id,
        username: claims.username,
    });

    Ok(next.run(req).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::MissingToken)
    }
}
