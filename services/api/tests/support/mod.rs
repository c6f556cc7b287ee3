//! Shared helpers for the router integration tests
//!
//! The application is driven through `tower::ServiceExt::oneshot` against
//! in-memory stores, so no MongoDB server is needed.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use api::{
    AppState, ServerConfig, create_app,
    models::{ImageBlob, NewPost, Post, PostChanges, PostImage},
    repositories::PostStore,
};
use async_trait::async_trait;
use auth::{
    JwtConfig, JwtService, UserStore,
    models::{NewUser, User},
};
use axum::{
    Router,
    body::{Body, Bytes},
    http::{HeaderMap, Request, StatusCode, header},
};
use bson::{DateTime, oid::ObjectId};
use common::error::DatabaseResult;
use tower::ServiceExt;

pub const BOUNDARY: &str = "devblog-test-boundary";

/// Users kept in a vector
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl MemoryUserStore {
    /// Insert a user directly, skipping password hashing
    pub fn seed(&self, username: &str) -> User {
        let user = NewUser {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password_hash: "not-a-real-hash".to_string(),
        }
        .into_user();
        self.users.lock().unwrap().push(user.clone());
        user
    }

    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, new_user: NewUser) -> DatabaseResult<User> {
        let user = new_user.into_user();
        self.users.lock().unwrap().push(user.clone());
        Ok(user)
    }

    async fn find_by_username_or_email(&self, identifier: &str) -> DatabaseResult<Option<User>> {
        let email = identifier.to_lowercase();
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email || u.username == identifier)
            .cloned())
    }

    async fn exists(&self, username: &str, email: &str) -> DatabaseResult<bool> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .any(|u| u.username == username || u.email == email))
    }

    async fn find_by_id(&self, id: ObjectId) -> DatabaseResult<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[ObjectId]) -> DatabaseResult<Vec<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }
}

/// Posts kept in insertion order, image bytes included
#[derive(Default)]
pub struct MemoryPostStore {
    posts: Mutex<Vec<Post>>,
}

impl MemoryPostStore {
    /// The stored document including image bytes
    pub fn raw(&self, id: ObjectId) -> Option<Post> {
        self.posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    /// Store a document as is, e.g. one written by an older version
    pub fn insert(&self, post: Post) {
        self.posts.lock().unwrap().push(post);
    }

    pub fn len(&self) -> usize {
        self.posts.lock().unwrap().len()
    }
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn list(&self) -> DatabaseResult<Vec<Post>> {
        let mut posts: Vec<Post> = self.posts.lock().unwrap().iter().rev().cloned().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts.into_iter().map(Post::without_image_data).collect())
    }

    async fn find_by_id(&self, id: ObjectId) -> DatabaseResult<Option<Post>> {
        Ok(self.raw(id).map(Post::without_image_data))
    }

    async fn find_image(&self, id: ObjectId) -> DatabaseResult<Option<ImageBlob>> {
        Ok(self
            .raw(id)
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
        self.posts.lock().unwrap().push(post.clone());
        Ok(post.without_image_data())
    }

    async fn update(&self, id: ObjectId, changes: PostChanges) -> DatabaseResult<Option<Post>> {
        let mut posts = self.posts.lock().unwrap();
        let Some(post) = posts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };

        post.title = changes.title;
        post.subtitle = changes.subtitle;
        post.content = changes.content;
        if let Some(image) = changes.image {
            post.image = Some(PostImage::from(image));
        }
        post.updated_at = DateTime::now();

        Ok(Some(post.clone().without_image_data()))
    }

    async fn delete(&self, id: ObjectId) -> DatabaseResult<bool> {
        let mut posts = self.posts.lock().unwrap();
        let before = posts.len();
        posts.retain(|p| p.id != id);
        Ok(posts.len() < before)
    }

    async fn health_check(&self) -> DatabaseResult<bool> {
        Ok(true)
    }
}

/// Response parts collected for assertions
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("response body is not JSON")
    }
}

/// Application wired to in-memory stores
pub struct TestApp {
    pub router: Router,
    pub users: Arc<MemoryUserStore>,
    pub posts: Arc<MemoryPostStore>,
    pub jwt_service: JwtService,
}

impl TestApp {
    pub fn new() -> Self {
        let users = Arc::new(MemoryUserStore::default());
        let posts = Arc::new(MemoryPostStore::default());
        let jwt_service = JwtService::new(JwtConfig {
            secret: "integration-test-secret".to_string(),
            token_expiry: 3600,
        });

        let state = AppState::new(users.clone(), posts.clone(), jwt_service.clone());
        let router = create_app(state, &ServerConfig::default());

        Self {
            router,
            users,
            posts,
            jwt_service,
        }
    }

    /// Seed a user and return it with a valid bearer token
    pub fn user(&self, username: &str) -> (User, String) {
        let user = self.users.seed(username);
        let token = self
            .jwt_service
            .generate_token(&user)
            .expect("failed to sign token");
        (user, token)
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read body");

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> TestResponse {
        let request = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Send a multipart post form with an optional bearer token
    pub async fn send_form(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        form: &Form,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            );
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        self.send(builder.body(Body::from(form.encode())).unwrap())
            .await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        let mut builder = Request::delete(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// Create a post as `token`'s owner and return its id
    pub async fn create_post(&self, token: &str, form: &Form) -> String {
        let response = self.send_form("POST", "/api/posts", Some(token), form).await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.json()["_id"]
            .as_str()
            .expect("created post has an id")
            .to_string()
    }
}

/// Multipart form builder
#[derive(Default, Clone)]
pub struct Form {
    fields: Vec<(String, String)>,
    file: Option<(String, Vec<u8>)>,
}

impl Form {
    pub fn post(title: &str, content: &str) -> Self {
        Form::default().text("title", title).text("content", content)
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.fields.push((name.to_string(), value.to_string()));
        self
    }

    pub fn image(mut self, content_type: &str, bytes: &[u8]) -> Self {
        self.file = Some((content_type.to_string(), bytes.to_vec()));
        self
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut body = Vec::new();

        for (name, value) in &self.fields {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                    BOUNDARY, name, value
                )
                .as_bytes(),
            );
        }

        if let Some((content_type, bytes)) = &self.file {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"upload\"\r\nContent-Type: {}\r\n\r\n",
                    BOUNDARY, content_type
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }

        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        body
    }
}
