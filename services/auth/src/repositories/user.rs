//! MongoDB user repository

use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use common::error::{DatabaseError, DatabaseResult};
use futures_util::TryStreamExt;
use mongodb::{Collection, Database, IndexModel, options::IndexOptions};
use tracing::info;

use super::UserStore;
use crate::models::{NewUser, User};

const COLLECTION: &str = "users";

/// User repository backed by the `users` collection
#[derive(Clone)]
pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    /// Create a new user repository
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(COLLECTION),
        }
    }

    /// Create the unique indexes on username and email
    pub async fn ensure_indexes(&self) -> DatabaseResult<()> {
        let unique = IndexOptions::builder().unique(true).build();
        let indexes = [
            IndexModel::builder()
                .keys(doc! { "username": 1 })
                .options(unique.clone())
                .build(),
            IndexModel::builder()
                .keys(doc! { "email": 1 })
                .options(unique)
                .build(),
        ];

        self.collection
            .create_indexes(indexes, None)
            .await
            .map_err(DatabaseError::Query)?;

        info!("User indexes ensured");
        Ok(())
    }
}

#[async_trait]
impl UserStore for MongoUserRepository {
    async fn create(&self, new_user: NewUser) -> DatabaseResult<User> {
        info!("Creating new user: {}", new_user.username);

        let user = new_user.into_user();
        self.collection
            .insert_one(&user, None)
            .await
            .map_err(DatabaseError::from_write)?;

        Ok(user)
    }

    async fn find_by_username_or_email(&self, identifier: &str) -> DatabaseResult<Option<User>> {
        info!("Finding user by username or email: {}", identifier);

        let filter = doc! {
            "$or": [
                { "email": identifier.to_lowercase() },
                { "username": identifier },
            ]
        };

        self.collection
            .find_one(filter, None)
            .await
            .map_err(DatabaseError::Query)
    }

    async fn exists(&self, username: &str, email: &str) -> DatabaseResult<bool> {
        let filter = doc! {
            "$or": [
                { "email": email },
                { "username": username },
            ]
        };

        let count = self
            .collection
            .count_documents(filter, None)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(count > 0)
    }

    async fn find_by_id(&self, id: ObjectId) -> DatabaseResult<Option<User>> {
        self.collection
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(DatabaseError::Query)
    }

    async fn find_by_ids(&self, ids: &[ObjectId]) -> DatabaseResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let cursor = self
            .collection
            .find(doc! { "_id": { "$in": ids.to_vec() } }, None)
            .await
            .map_err(DatabaseError::Query)?;

        cursor.try_collect().await.map_err(DatabaseError::Query)
    }
}
