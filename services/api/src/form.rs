//! Multipart form handling for post create and update

use axum::{
    body::Bytes,
    extract::{Multipart, multipart::MultipartError},
    http::StatusCode,
};
use bson::oid::ObjectId;
use tracing::warn;

use crate::{
    error::{ApiError, ApiResult},
    models::{ImageBlob, NewPost, PostChanges},
};

/// Largest accepted image upload
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Request body limit for post forms: the image plus room for the text fields
pub const MAX_FORM_BYTES: usize = MAX_IMAGE_BYTES + 1024 * 1024;

/// Validated post form
#[derive(Debug, Clone, PartialEq)]
pub struct PostForm {
    pub title: String,
    pub subtitle: Option<String>,
    pub content: String,
    pub image: Option<ImageBlob>,
}

/// File part as received, before validation
#[derive(Debug, Clone, Default)]
pub struct RawImage {
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Form fields as received, before validation
#[derive(Debug, Clone, Default)]
pub struct RawPostForm {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub content: Option<String>,
    pub image: Option<RawImage>,
}

impl RawPostForm {
    /// Collect the known fields of a multipart body; other fields are skipped
    pub async fn from_multipart(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = RawPostForm::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();

            match name.as_str() {
                "title" => form.title = Some(field.text().await.map_err(multipart_error)?),
                "subtitle" => form.subtitle = Some(field.text().await.map_err(multipart_error)?),
                "content" => form.content = Some(field.text().await.map_err(multipart_error)?),
                "image" => {
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await.map_err(multipart_error)?;
                    form.image = Some(RawImage {
                        content_type,
                        bytes,
                    });
                }
                _ => {}
            }
        }

        Ok(form)
    }

    /// Check required fields and the image constraints
    pub fn validate(self) -> ApiResult<PostForm> {
        let title = required(self.title, "Title is required")?;
        let content = required(self.content, "Content is required")?;
        let subtitle = self
            .subtitle
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let image = match self.image {
            // An empty file input still arrives as a part with no bytes
            Some(raw) if raw.bytes.is_empty() => None,
            Some(raw) => Some(validate_image(raw)?),
            None => None,
        };

        Ok(PostForm {
            title,
            subtitle,
            content,
            image,
        })
    }
}

impl PostForm {
    /// Read and validate a post form from a multipart body
    pub async fn from_multipart(multipart: Multipart) -> ApiResult<Self> {
        RawPostForm::from_multipart(multipart).await?.validate()
    }

    pub fn into_new_post(self, author: ObjectId) -> NewPost {
        NewPost {
            title: self.title,
            subtitle: self.subtitle,
            content: self.content,
            image: self.image,
            author,
        }
    }

    pub fn into_changes(self) -> PostChanges {
        PostChanges {
            title: self.title,
            subtitle: self.subtitle,
            content: self.content,
            image: self.image,
        }
    }
}

fn required(value: Option<String>, message: &str) -> ApiResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(message.to_string()))
}

fn validate_image(raw: RawImage) -> ApiResult<ImageBlob> {
    if raw.bytes.len() > MAX_IMAGE_BYTES {
        return Err(ApiError::PayloadTooLarge);
    }

    let content_type = raw
        .content_type
        .filter(|ct| ct.starts_with("image/"))
        .ok_or_else(|| ApiError::BadRequest("Only image uploads are allowed".to_string()))?;

    Ok(ImageBlob {
        bytes: raw.bytes.to_vec(),
        content_type,
    })
}

fn multipart_error(e: MultipartError) -> ApiError {
    warn!("Rejected multipart body: {}", e);
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::BadRequest(e.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(title: &str, content: &str) -> RawPostForm {
        RawPostForm {
            title: Some(title.to_string()),
            content: Some(content.to_string()),
            ..Default::default()
        }
    }

    fn png(len: usize) -> RawImage {
        RawImage {
            content_type: Some("image/png".to_string()),
            bytes: Bytes::from(vec![7u8; len]),
        }
    }

    #[test]
    fn test_valid_form_is_trimmed() {
        let mut form = raw("  Rust tips ", "Use the borrow checker");
        form.subtitle = Some("   ".to_string());

        let form = form.validate().unwrap();
        assert_eq!(form.title, "Rust tips");
        assert_eq!(form.subtitle, None);
        assert_eq!(form.image, None);
    }

    #[test]
    fn test_missing_title_or_content_is_rejected() {
        let missing_title = RawPostForm {
            content: Some("body".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            missing_title.validate(),
            Err(ApiError::BadRequest(msg)) if msg == "Title is required"
        ));

        assert!(matches!(
            raw("Title", "  \n").validate(),
            Err(ApiError::BadRequest(msg)) if msg == "Content is required"
        ));
    }

    #[test]
    fn test_image_is_kept_with_content_type() {
        let mut form = raw("Title", "Body");
        form.image = Some(png(16));

        let image = form.validate().unwrap().image.unwrap();
        assert_eq!(image.content_type, "image/png");
        assert_eq!(image.bytes.len(), 16);
    }

    #[test]
    fn test_empty_file_part_is_ignored() {
        let mut form = raw("Title", "Body");
        form.image = Some(RawImage {
            content_type: Some("application/octet-stream".to_string()),
            bytes: Bytes::new(),
        });

        assert_eq!(form.validate().unwrap().image, None);
    }

    #[test]
    fn test_oversize_image_is_rejected() {
        let mut form = raw("Title", "Body");
        form.image = Some(png(MAX_IMAGE_BYTES + 1));

        assert!(matches!(form.validate(), Err(ApiError::PayloadTooLarge)));
    }

    #[test]
    fn test_non_image_upload_is_rejected() {
        let mut form = raw("Title", "Body");
        form.image = Some(RawImage {
            content_type: Some("application/pdf".to_string()),
            bytes: Bytes::from_static(b"%PDF-1.7"),
        });

        assert!(matches!(form.validate(), Err(ApiError::BadRequest(_))));
    }
}
