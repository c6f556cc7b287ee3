//! Post persistence

use async_trait::async_trait;
use bson::oid::ObjectId;
use common::error::DatabaseResult;

use crate::models::{ImageBlob, NewPost, Post, PostChanges};

pub mod post;

pub use post::MongoPostRepository;

/// Storage operations the post handlers rely on
///
/// Every method returning a [`Post`] returns it without image bytes; only
/// [`PostStore::find_image`] loads them.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// All posts, newest first
    async fn list(&self) -> DatabaseResult<Vec<Post>>;

    async fn find_by_id(&self, id: ObjectId) -> DatabaseResult<Option<Post>>;

    /// The stored image of a post, `None` if the post or its image is missing
    async fn find_image(&self, id: ObjectId) -> DatabaseResult<Option<ImageBlob>>;

    async fn create(&self, new_post: NewPost) -> DatabaseResult<Post>;

    /// Apply `changes`, returning the updated post or `None` if it no longer exists
    async fn update(&self, id: ObjectId, changes: PostChanges) -> DatabaseResult<Option<Post>>;

    /// Remove a post, returning whether anything was deleted
    async fn delete(&self, id: ObjectId) -> DatabaseResult<bool>;

    /// Whether the backing store is reachable
    async fn health_check(&self) -> DatabaseResult<bool>;
}
