#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use sigil_api::auth::{generate_jwt, Claims};
use sigil_api::config::AppConfig;
use sigil_api::database::models::User;
use sigil_api::database::{Backend, MemorySigilStore, MemoryUserStore, SigilStore, Stores, UserStore};
use sigil_api::storage::MediaStorage;
use sigil_api::{app, AppState};

pub const JWT_SECRET: &str = "integration-test-secret";
pub const MEDIA_URL: &str = "http://testserver/media/";
pub const BOUNDARY: &str = "sigil-test-boundary";

/// Smallest byte run the image sniffer accepts as PNG
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01";

/// A router over fresh in-memory stores and a private media directory
pub struct TestApp {
    pub router: Router,
    pub users: Arc<MemoryUserStore>,
    pub sigils: Arc<dyn SigilStore>,
    pub media_root: PathBuf,
}

impl TestApp {
    pub fn new() -> Result<Self> {
        Self::with_sigil_store(Arc::new(MemorySigilStore::new()))
    }

    /// Same as `new`, with `sigils` standing in for the in-memory sigil store
    pub fn with_sigil_store(sigils: Arc<dyn SigilStore>) -> Result<Self> {
        let media_root = std::env::temp_dir().join(format!("sigil-it-{}", Uuid::new_v4().simple()));

        let mut config = AppConfig::development();
        config.security.jwt_secret = JWT_SECRET.to_string();
        config.storage.media_root = media_root.clone();
        config.storage.media_url = MEDIA_URL.to_string();

        let users = Arc::new(MemoryUserStore::new());
        let stores = Stores {
            backend: Backend::Memory,
            sigils: sigils.clone(),
            users: users.clone(),
        };

        let media = MediaStorage::from_config(&config.storage).context("media storage")?;
        let router = app(AppState::new(Arc::new(config), stores, media));

        Ok(Self {
            router,
            users,
            sigils,
            media_root,
        })
    }

    /// Create an active user and a valid bearer token for them
    pub async fn user_with_token(&self, username: &str) -> Result<(User, String)> {
        let user = self.users.create(username).await?;
        let token = token_for(&user, 1)?;
        Ok((user, token))
    }

    pub async fn send(&self, request: Request<Body>) -> Result<(StatusCode, Value)> {
        let (status, bytes) = self.send_raw(request).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .with_context(|| format!("non-JSON body: {}", String::from_utf8_lossy(&bytes)))?
        };
        Ok((status, body))
    }
}

impl TestApp {
    pub async fn send_raw(&self, request: Request<Body>) -> Result<(StatusCode, Vec<u8>)> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        Ok((status, bytes.to_vec()))
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.media_root);
    }
}

pub fn token_for(user: &User, expiry_hours: u64) -> Result<String> {
    Ok(generate_jwt(&Claims::for_user(user, expiry_hours), JWT_SECRET)?)
}

pub fn get(uri: &str, token: Option<&str>) -> Result<Request<Body>> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    Ok(builder.body(Body::empty())?)
}

pub fn post_json(uri: &str, token: Option<&str>, body: &Value) -> Result<Request<Body>> {
    post(uri, token, "application/json", serde_json::to_vec(body)?)
}

pub fn post_form(uri: &str, token: Option<&str>, pairs: &[(&str, &str)]) -> Result<Request<Body>> {
    let encoded = pairs
        .iter()
        .map(|(k, v)| format!("{}={}", url_encode(k), url_encode(v)))
        .collect::<Vec<_>>()
        .join("&");
    post(uri, token, "application/x-www-form-urlencoded", encoded.into_bytes())
}

pub fn post_multipart(uri: &str, token: Option<&str>, form: MultipartForm) -> Result<Request<Body>> {
    post(
        uri,
        token,
        &format!("multipart/form-data; boundary={}", BOUNDARY),
        form.into_bytes(),
    )
}

fn post(uri: &str, token: Option<&str>, content_type: &str, body: Vec<u8>) -> Result<Request<Body>> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, content_type);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    Ok(builder.body(Body::from(body))?)
}

fn url_encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Hand-built multipart/form-data body
#[derive(Default)]
pub struct MultipartForm {
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, name, file_name, content_type
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn png(self) -> Self {
        self.file("image", "sigil.png", "image/png", PNG_BYTES)
    }

    fn into_bytes(mut self) -> Vec<u8> {
        self.body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        self.body
    }
}
