use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use super::auth::AuthUser;
use crate::app::AppState;
use crate::error::ApiError;

/// The caller, confirmed against the user store
#[derive(Clone, Debug)]
pub struct ValidatedUser {
    pub id: Uuid,
    pub username: String,
}

/// Middleware that checks the JWT subject is still an active user.
/// Tokens for deleted or deactivated users are treated as unauthenticated.
pub async fn validate_user_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // Get AuthUser from JWT middleware
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("JWT authentication required before user validation"))?;

    let user = state.users.find_active(auth_user.user_id).await?.ok_or_else(|| {
        tracing::warn!(
            "User validation failed: user '{}' (ID: {}) not found or inactive",
            auth_user.username,
            auth_user.user_id
        );
        ApiError::unauthorized("User inactive or deleted.")
    })?;

    // Verify that JWT claims match the stored record
    if user.username != auth_user.username {
        tracing::warn!(
            "User validation failed: JWT user '{}' doesn't match stored username '{}'",
            auth_user.username,
            user.username
        );
        return Err(ApiError::unauthorized("User authentication mismatch"));
    }

    tracing::debug!("User validation successful: {} ({})", user.username, user.id);

    request.extensions_mut().insert(ValidatedUser {
        id: user.id,
        username: user.username,
    });

    Ok(next.run(request).await)
}
