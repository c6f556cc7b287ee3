//! Authentication for the Dev Blog application
//!
//! Users sign up and log in through the `/api/auth` routes and receive a
//! signed bearer token. Protected routes in every service validate that
//! token with [`middleware::auth_middleware`] and read the caller from the
//! [`middleware::AuthUser`] extractor.

use std::sync::Arc;

pub mod error;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod repositories;
pub mod routes;
pub mod validation;

pub use error::AuthError;
pub use jwt::{JwtConfig, JwtService};
pub use middleware::{AuthUser, auth_middleware};
pub use repositories::{MongoUserRepository, UserStore};

/// State needed by the authentication handlers
#[derive(Clone)]
pub struct AuthState {
    pub users: Arc<dyn UserStore>,
    pub jwt_service: JwtService,
}
