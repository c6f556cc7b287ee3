//! MongoDB post repository

use async_trait::async_trait;
use bson::{Binary, Document, doc, oid::ObjectId, spec::BinarySubtype};
use common::{
    database,
    error::{DatabaseError, DatabaseResult},
};
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    options::{FindOneAndUpdateOptions, FindOneOptions, FindOptions, ReturnDocument},
};
use serde::Deserialize;
use tracing::info;

use super::PostStore;
use crate::models::{ImageBlob, NewPost, Post, PostChanges, PostImage};

const COLLECTION: &str = "posts";

/// Projection that leaves the image bytes in the database
///
/// `imageStored` tells the handlers whether there are bytes to link to.
/// Computed fields need MongoDB 4.4 or later.
fn without_image_data() -> Document {
    doc! {
        "title": 1,
        "subtitle": 1,
        "content": 1,
        "author": 1,
        "createdAt": 1,
        "updatedAt": 1,
        "image.contentType": 1,
        "imageStored": { "$eq": [{ "$type": "$image.data" }, "binData"] },
    }
}

/// Only the image of a post
#[derive(Debug, Deserialize)]
struct ImageOnly {
    #[serde(default)]
    image: Option<PostImage>,
}

/// Post repository backed by the `posts` collection
#[derive(Clone)]
pub struct MongoPostRepository {
    database: Database,
    collection: Collection<Post>,
}

impl MongoPostRepository {
    /// Create a new post repository
    pub fn new(database: &Database) -> Self {
        Self {
            database: database.clone(),
            collection: database.collection(COLLECTION),
        }
    }

    /// Create the indexes backing the list ordering and author lookups
    pub async fn ensure_indexes(&self) -> DatabaseResult<()> {
        let indexes = [
            IndexModel::builder().keys(doc! { "createdAt": -1 }).build(),
            IndexModel::builder().keys(doc! { "author": 1 }).build(),
        ];

        self.collection
            .create_indexes(indexes, None)
            .await
            .map_err(DatabaseError::Query)?;

        info!("Post indexes ensured");
        Ok(())
    }
}

#[async_trait]
impl PostStore for MongoPostRepository {
    async fn list(&self) -> DatabaseResult<Vec<Post>> {
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .projection(without_image_data())
            .build();

        let cursor = self
            .collection
            .find(doc! {}, options)
            .await
            .map_err(DatabaseError::Query)?;

        cursor.try_collect().await.map_err(DatabaseError::Query)
    }

    async fn find_by_id(&self, id: ObjectId) -> DatabaseResult<Option<Post>> {
        let options = FindOneOptions::builder()
            .projection(without_image_data())
            .build();

        self.collection
            .find_one(doc! { "_id": id }, options)
            .await
            .map_err(DatabaseError::Query)
    }

    async fn find_image(&self, id: ObjectId) -> DatabaseResult<Option<ImageBlob>> {
        let options = FindOneOptions::builder()
            .projection(doc! { "image": 1 })
            .build();

        let found = self
            .collection
            .clone_with_type::<ImageOnly>()
            .find_one(doc! { "_id": id }, options)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(found
            .and_then(|post| post.image)
            .and_then(|image| {
                image.data.map(|data| ImageBlob {
                    bytes: data.bytes,
                    content_type: image.content_type,
                })
            }))
    }

    async fn create(&self, new_post: NewPost) -> DatabaseResult<Post> {
        let post = new_post.into_post();
        info!("Creating post {} for author {}", post.id, post.author);

        self.collection
            .insert_one(&post, None)
            .await
            .map_err(DatabaseError::from_write)?;

        Ok(post.without_image_data())
    }

    async fn update(&self, id: ObjectId, changes: PostChanges) -> DatabaseResult<Option<Post>> {
        info!("Updating post {}", id);

        let mut set = doc! {
            "title": changes.title,
            "content": changes.content,
            "updatedAt": bson::DateTime::now(),
        };
        let mut update = Document::new();

        match changes.subtitle {
            Some(subtitle) => {
                set.insert("subtitle", subtitle);
            }
            None => {
                update.insert("$unset", doc! { "subtitle": "" });
            }
        }

        if let Some(image) = changes.image {
            let data = Binary {
                subtype: BinarySubtype::Generic,
                bytes: image.bytes,
            };
            set.insert(
                "image",
                doc! { "data": data, "contentType": image.content_type },
            );
        }
        update.insert("$set", set);

        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .projection(without_image_data())
            .build();

        self.collection
            .find_one_and_update(doc! { "_id": id }, update, options)
            .await
            .map_err(DatabaseError::Query)
    }

    async fn delete(&self, id: ObjectId) -> DatabaseResult<bool> {
        info!("Deleting post {}", id);

        let result = self
            .collection
            .delete_one(doc! { "_id": id }, None)
            .await
            .map_err(DatabaseError::Query)?;

        Ok(result.deleted_count > 0)
    }

    async fn health_check(&self) -> DatabaseResult<bool> {
        database::health_check(&self.database).await
    }
}
