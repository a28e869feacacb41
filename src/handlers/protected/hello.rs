use axum::Extension;
use serde::Serialize;

use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};

#[derive(Debug, Serialize)]
pub struct HelloResponse {
    pub message: &'static str,
}

/// GET /hello/ - static greeting, useful for checking a token works
pub async fn hello_get(Extension(user): Extension<ValidatedUser>) -> ApiResult<HelloResponse> {
    tracing::debug!("hello from {}", user.username);
    Ok(ApiResponse::success(HelloResponse {
        message: "Hello from the Sigil API!",
    }))
}
