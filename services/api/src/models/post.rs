//! Post models for the API service

use auth::models::User;
use bson::{
    Binary, DateTime,
    oid::ObjectId,
    spec::BinarySubtype,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Image embedded in a post document
///
/// `data` is absent whenever the document was loaded with the image bytes
/// projected away, which is how every read except the image endpoint works.
/// Such reads report whether bytes exist through [`Post::image_stored`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostImage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Binary>,
    pub content_type: String,
}

/// Post document as stored in the `posts` collection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<PostImage>,
    /// Id of the owning user
    pub author: ObjectId,
    pub created_at: DateTime,
    pub updated_at: DateTime,
    /// Computed by read projections, never written
    #[serde(default, skip_serializing)]
    pub image_stored: bool,
}

impl Post {
    /// Whether image bytes are stored for this post
    ///
    /// An `image` holding only a content type has nothing to serve.
    pub fn has_image(&self) -> bool {
        self.image_stored
            || self
                .image
                .as_ref()
                .is_some_and(|image| image.data.is_some())
    }

    /// Drop the raw image bytes, keeping the content type
    pub fn without_image_data(mut self) -> Self {
        self.image_stored = self.has_image();
        if let Some(image) = self.image.as_mut() {
            image.data = None;
        }
        self
    }
}

/// Raw image bytes with their MIME type
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBlob {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl From<ImageBlob> for PostImage {
    fn from(blob: ImageBlob) -> Self {
        PostImage {
            data: Some(Binary {
                subtype: BinarySubtype::Generic,
                bytes: blob.bytes,
            }),
            content_type: blob.content_type,
        }
    }
}

/// Post creation payload
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub subtitle: Option<String>,
    pub content: String,
    pub image: Option<ImageBlob>,
    pub author: ObjectId,
}

impl NewPost {
    /// Build the document to insert, stamping id and timestamps
    pub fn into_post(self) -> Post {
        let now = DateTime::now();
        Post {
            id: ObjectId::new(),
            title: self.title,
            subtitle: self.subtitle,
            content: self.content,
            image: self.image.map(PostImage::from),
            author: self.author,
            created_at: now,
            updated_at: now,
            image_stored: false,
        }
    }
}

/// Post update payload
///
/// Title, subtitle and content are replaced wholesale; the image only when
/// a new one was uploaded.
#[derive(Debug, Clone)]
pub struct PostChanges {
    pub title: String,
    pub subtitle: Option<String>,
    pub content: String,
    pub image: Option<ImageBlob>,
}

/// Author reference resolved to a display name
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthorSummary {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
}

/// Post as returned by the API, never carrying image bytes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub content: String,
    pub image_url: Option<String>,
    pub author: Option<AuthorSummary>,
    pub created_at: chrono::DateTime<Utc>,
    pub updated_at: chrono::DateTime<Utc>,
}

impl PostResponse {
    /// `author` is `None` when the owning user no longer exists
    pub fn new(post: &Post, author: Option<&User>) -> Self {
        Self {
            id: post.id.to_hex(),
            title: post.title.clone(),
            subtitle: post.subtitle.clone(),
            content: post.content.clone(),
            image_url: post.has_image().then(|| image_url(&post.id)),
            author: author.map(|user| AuthorSummary {
                id: user.id.to_hex(),
                username: user.username.clone(),
            }),
            created_at: post.created_at.to_chrono(),
            updated_at: post.updated_at.to_chrono(),
        }
    }
}

/// Path of the endpoint serving a post's image
pub fn image_url(id: &ObjectId) -> String {
    format!("/api/posts/{}/image", id.to_hex())
}
