use axum::extract::{Path, State};
use uuid::Uuid;

use crate::api::SigilResponse;
use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /sigils/:id/ - show single sigil by id
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<SigilResponse> {
    // a malformed id can't name a record, so it's a 404 like any other miss
    let id = Uuid::parse_str(&id).map_err(|_| ApiError::not_found("Sigil not found."))?;

    let record = state
        .sigils
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Sigil not found."))?;

    Ok(ApiResponse::success(SigilResponse::from_record(record, &state.media)))
}
