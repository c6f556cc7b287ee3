//! Application state shared across handlers

use std::sync::Arc;

use auth::{AuthState, JwtService, UserStore};
use axum::extract::FromRef;

use crate::repositories::PostStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub posts: Arc<dyn PostStore>,
    pub jwt_service: JwtService,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserStore>,
        posts: Arc<dyn PostStore>,
        jwt_service: JwtService,
    ) -> Self {
        Self {
            users,
            posts,
            jwt_service,
        }
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        AuthState {
            users: state.users.clone(),
            jwt_service: state.jwt_service.clone(),
        }
    }
}
