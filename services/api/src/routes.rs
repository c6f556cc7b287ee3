//! API service routes

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde_json::json;
use tracing::error;

use crate::state::AppState;

pub mod posts;

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let jwt_service = state.jwt_service.clone();

    Router::new()
        .route("/", get(welcome))
        .route("/health", get(health_check))
        .nest("/api/auth", auth::routes::router(jwt_service.clone()))
        .nest("/api/posts", posts::router(jwt_service))
        .with_state(state)
}

/// Root endpoint
pub async fn welcome() -> impl IntoResponse {
    Json(json!({
        "message": "Welcome to the Developer Blogging API"
    }))
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.posts.health_check().await {
        Ok(true) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "service": "devblog-api"
            })),
        ),
        Ok(false) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "unavailable" })),
        ),
        Err(e) => {
            error!("Database health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unavailable" })),
            )
        }
    }
}
