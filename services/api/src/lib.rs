//! Dev Blog API service
//!
//! Serves the `/api/auth` and `/api/posts` REST endpoints on top of MongoDB.
//! [`create_app`] assembles the full HTTP application from an [`AppState`],
//! which lets tests drive it against in-memory stores.

use axum::{
    Router,
    http::{HeaderValue, Method, header, request::Parts},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod form;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod state;

pub use crate::config::ServerConfig;
pub use state::AppState;

/// Build the HTTP application with CORS and request tracing
pub fn create_app(state: AppState, config: &ServerConfig) -> Router {
    routes::create_router(state)
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins = origins.to_vec();

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _request: &Parts| {
                origin
                    .to_str()
                    .map(|origin| crate::config::origin_allowed(&origins, origin))
                    .unwrap_or(false)
            },
        ))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}
