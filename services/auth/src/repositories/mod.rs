//! User persistence

use async_trait::async_trait;
use bson::oid::ObjectId;
use common::error::DatabaseResult;

use crate::models::{NewUser, User};

pub mod user;

pub use user::MongoUserRepository;

/// Storage operations the authentication handlers rely on
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user; a taken username or email yields `DatabaseError::Duplicate`
    async fn create(&self, new_user: NewUser) -> DatabaseResult<User>;

    /// Find a user whose email or username equals `identifier`
    async fn find_by_username_or_email(&self, identifier: &str) -> DatabaseResult<Option<User>>;

    /// Whether the username or the email is already registered
    async fn exists(&self, username: &str, email: &str) -> DatabaseResult<bool>;

    async fn find_by_id(&self, id: ObjectId) -> DatabaseResult<Option<User>>;

    /// Users for the given ids, in no particular order; unknown ids are skipped
    async fn find_by_ids(&self, ids: &[ObjectId]) -> DatabaseResult<Vec<User>>;
}
