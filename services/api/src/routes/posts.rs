//! Post resource routes
//!
//! Mounted under `/api/posts`. Reads are public; create, update and delete
//! need a bearer token, and update and delete only succeed for the author.

use std::collections::{HashMap, HashSet};

use auth::{AuthUser, JwtService, auth_middleware, models::User};
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State, multipart::MultipartRejection},
    http::{StatusCode, header},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use bson::oid::ObjectId;
use serde_json::json;
use tracing::{info, warn};

use crate::{
    error::{ApiError, ApiResult},
    form::{MAX_FORM_BYTES, PostForm},
    models::{Post, PostResponse},
    state::AppState,
};

const IMAGE_CACHE_CONTROL: &str = "public, max-age=31536000";

/// Create the router for the post endpoints
pub fn router(jwt_service: JwtService) -> Router<AppState> {
    let protected_routes = Router::new()
        .route("/", post(create_post))
        .route("/:id", put(update_post).delete(delete_post))
        .route_layer(middleware::from_fn_with_state(jwt_service, auth_middleware))
        .layer(DefaultBodyLimit::max(MAX_FORM_BYTES));

    Router::new()
        .route("/", get(list_posts))
        .route("/:id", get(get_post))
        .route("/:id/image", get(get_post_image))
        .merge(protected_routes)
}

/// Get all posts, newest first
pub async fn list_posts(State(state): State<AppState>) -> ApiResult<Json<Vec<PostResponse>>> {
    let posts = state.posts.list().await?;
    let responses = with_authors(&state, &posts).await?;

    Ok(Json(responses))
}

/// Get a single post
pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PostResponse>> {
    let id = parse_post_id(&id)?;
    let post = find_post(&state, id).await?;
    let author = state.users.find_by_id(post.author).await?;

    Ok(Json(PostResponse::new(&post, author.as_ref())))
}

/// Get the stored image of a post
pub async fn get_post_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let id = parse_post_id(&id).map_err(|_| image_not_found())?;
    let image = state
        .posts
        .find_image(id)
        .await?
        .ok_or_else(image_not_found)?;

    let headers = [
        (header::CONTENT_TYPE, image.content_type),
        (header::CACHE_CONTROL, IMAGE_CACHE_CONTROL.to_string()),
    ];

    Ok((headers, image.bytes).into_response())
}

/// Create a post owned by the caller
pub async fn create_post(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<impl IntoResponse> {
    let form = PostForm::from_multipart(multipart?).await?;
    let post = state.posts.create(form.into_new_post(user.id)).await?;
    info!("Post {} created by {}", post.id, user.username);

    let author = state.users.find_by_id(user.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(PostResponse::new(&post, author.as_ref())),
    ))
}

/// Replace the fields of a post owned by the caller
pub async fn update_post(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<PostResponse>> {
    let id = parse_post_id(&id)?;
    let existing = find_post(&state, id).await?;
    ensure_author(&existing, &user)?;

    let form = PostForm::from_multipart(multipart?).await?;
    let post = state
        .posts
        .update(id, form.into_changes())
        .await?
        .ok_or_else(post_not_found)?;
    info!("Post {} updated by {}", post.id, user.username);

    let author = state.users.find_by_id(post.author).await?;

    Ok(Json(PostResponse::new(&post, author.as_ref())))
}

/// Delete a post owned by the caller
pub async fn delete_post(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_post_id(&id)?;
    let existing = find_post(&state, id).await?;
    ensure_author(&existing, &user)?;

    if !state.posts.delete(id).await? {
        return Err(post_not_found());
    }
    info!("Post {} deleted by {}", id, user.username);

    Ok(Json(json!({ "message": "Post removed" })))
}

/// An id that is not an ObjectId cannot name a stored post
fn parse_post_id(id: &str) -> ApiResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| post_not_found())
}

async fn find_post(state: &AppState, id: ObjectId) -> ApiResult<Post> {
    state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(post_not_found)
}

fn ensure_author(post: &Post, user: &AuthUser) -> ApiResult<()> {
    if post.author != user.id {
        warn!(
            "User {} tried to modify post {} owned by {}",
            user.id, post.id, post.author
        );
        return Err(ApiError::Unauthorized);
    }
    Ok(())
}

/// Resolve the authors of `posts` with a single lookup
async fn with_authors(state: &AppState, posts: &[Post]) -> ApiResult<Vec<PostResponse>> {
    let author_ids: Vec<ObjectId> = posts
        .iter()
        .map(|post| post.author)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let authors: HashMap<ObjectId, User> = state
        .users
        .find_by_ids(&author_ids)
        .await?
        .into_iter()
        .map(|user| (user.id, user))
        .collect();

    Ok(posts
        .iter()
        .map(|post| PostResponse::new(post, authors.get(&post.author)))
        .collect())
}

fn post_not_found() -> ApiError {
    ApiError::NotFound("Post not found".to_string())
}

fn image_not_found() -> ApiError {
    ApiError::NotFound("Image not found".to_string())
}
