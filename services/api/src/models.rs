//! API models for documents and response payloads

pub mod post;

pub use post::{AuthorSummary, ImageBlob, NewPost, Post, PostChanges, PostImage, PostResponse};
