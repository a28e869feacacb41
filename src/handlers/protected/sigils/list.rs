use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Extension,
};
use serde::Deserialize;

use crate::api::{parse_loose_bool, SigilResponse};
use crate::app::AppState;
use crate::database::SigilFilter;
use crate::error::ApiError;
use crate::handlers::protected::utils::clamp_limit;
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Only the caller's sigils when truthy
    pub mine: Option<String>,
    /// Filter on burn status when present
    pub is_burned: Option<String>,
    /// Pagination (optional)
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /sigils/ - every sigil, newest first
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<ValidatedUser>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Vec<SigilResponse>> {
    let Query(query) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;

    let filter = SigilFilter {
        owner: parse_loose_bool(query.mine.as_deref()).then_some(user.id),
        is_burned: query.is_burned.as_deref().map(|v| parse_loose_bool(Some(v))),
        limit: clamp_limit(query.limit, state.config.api.max_list_limit),
        offset: query.offset.map(|o| o.max(0)),
    };

    let records = state.sigils.list(&filter).await?;
    Ok(ApiResponse::success(SigilResponse::from_records(records, &state.media)))
}
