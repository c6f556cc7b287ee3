//! Authentication routes
//!
//! Mounted under `/api/auth` by the API service.

use axum::{
    Json, Router,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use common::error::DatabaseError;
use serde_json::json;
use tracing::{error, info, warn};

use crate::{
    AuthState,
    error::{AuthError, AuthResult},
    jwt::JwtService,
    middleware::{AuthUser, auth_middleware},
    models::{AuthResponse, LoginRequest, NewUser, SignupRequest, User, UserResponse},
    password,
    validation::{validate_email, validate_password, validate_username},
};

/// Create the router for the authentication endpoints
///
/// `jwt_service` guards the routes that need a logged in caller.
pub fn router<S>(jwt_service: JwtService) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    AuthState: FromRef<S>,
{
    let protected_routes = Router::new()
        .route("/me", get(me))
        .route_layer(middleware::from_fn_with_state(jwt_service, auth_middleware));

    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .merge(protected_routes)
}

/// User registration endpoint
pub async fn signup(
    State(state): State<AuthState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> AuthResult<impl IntoResponse> {
    let Json(payload) = payload?;
    let username = payload.username.trim().to_string();
    let email = payload.email.trim().to_lowercase();

    validate_username(&username).map_err(AuthError::Validation)?;
    validate_email(&email).map_err(AuthError::Validation)?;
    validate_password(&payload.password).map_err(AuthError::Validation)?;

    info!("Signup attempt for user: {}", username);

    let taken = state.users.exists(&username, &email).await.map_err(|e| {
        error!("Failed to check for existing user: {}", e);
        AuthError::InternalServerError
    })?;
    if taken {
        return Err(AuthError::UserExists);
    }

    let password_hash = hash_blocking(payload.password).await?;

    let user = state
        .users
        .create(NewUser {
            username,
            email,
            password_hash,
        })
        .await
        .map_err(|e| match e {
            DatabaseError::Duplicate(_) => AuthError::UserExists,
            e => {
                error!("Failed to create user: {}", e);
                AuthError::InternalServerError
            }
        })?;

    let response = issue_token(&state.jwt_service, &user)?;
    info!("User registered: {} ({})", user.username, user.id);

    Ok((StatusCode::CREATED, Json(response)))
}

/// User login endpoint
pub async fn login(
    State(state): State<AuthState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AuthResult<impl IntoResponse> {
    let Json(payload) = payload?;
    let identifier = payload.email.trim();
    info!("Login attempt for user: {}", identifier);

    let user = state
        .users
        .find_by_username_or_email(identifier)
        .await
        .map_err(|e| {
            error!("Failed to look up user: {}", e);
            AuthError::InternalServerError
        })?
        .ok_or_else(|| {
            warn!("User not found: {}", identifier);
            AuthError::InvalidCredentials
        })?;

    let stored_hash = user.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || {
        password::verify_password(&payload.password, &stored_hash)
    })
    .await
    .map_err(|e| {
        error!("Password verification task failed: {}", e);
        AuthError::InternalServerError
    })?
    .map_err(|e| {
        error!("Password verification error: {}", e);
        AuthError::InternalServerError
    })?;

    if !valid {
        warn!("Invalid password for user: {}", identifier);
        return Err(AuthError::InvalidCredentials);
    }

    let response = issue_token(&state.jwt_service, &user)?;
    info!("User logged in: {} ({})", user.username, user.id);

    Ok((StatusCode::OK, Json(response)))
}

/// Logout endpoint
///
/// Tokens are not tracked server side, so logging out is the client
/// discarding its token. The endpoint exists for clients that expect it.
pub async fn logout() -> impl IntoResponse {
    info!("Logout request");
    Json(json!({ "message": "Logged out successfully" }))
}

/// Current user endpoint
pub async fn me(State(state): State<AuthState>, user: AuthUser) -> AuthResult<Json<UserResponse>> {
    let user = state
        .users
        .find_by_id(user.id)
        .await
        .map_err(|e| {
            error!("Failed to load user {}: {}", user.id, e);
            AuthError::InternalServerError
        })?
        .ok_or(AuthError::NotFound)?;

    Ok(Json(UserResponse::from(&user)))
}

async fn hash_blocking(password: String) -> AuthResult<String> {
    tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|e| {
            error!("Password hashing task failed: {}", e);
            AuthError::InternalServerError
        })?
        .map_err(|e| {
            error!("Failed to hash password: {}", e);
            AuthError::InternalServerError
        })
}

fn issue_token(jwt_service: &JwtService, user: &User) -> AuthResult<AuthResponse> {
    let token = jwt_service.generate_token(user).map_err(|e| {
        error!("Failed to generate token: {}", e);
        AuthError::InternalServerError
    })?;

    Ok(AuthResponse {
        token,
        user: UserResponse::from(user),
    })
}
