use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Extension, Form, Json,
};
use serde::{Deserialize, Serialize};

use super::utils::{multipart_error, multipart_rejection};
use crate::error::ApiError;
use crate::incantation;
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};

#[derive(Debug, Default, Deserialize)]
pub struct IncantationRequest {
    #[serde(default)]
    pub incantation: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConsonantsResponse {
    pub consonants: Vec<String>,
}

/// Request body accepted as JSON, a urlencoded form or multipart.
/// Any other (or missing) content type reads as an empty incantation.
#[derive(Debug)]
pub struct IncantationBody(pub IncantationRequest);

#[async_trait]
impl<S> FromRequest<S> for IncantationBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("application/json") {
            let Json(body) = Json::<IncantationRequest>::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            Ok(Self(body))
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(body) = Form::<IncantationRequest>::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            Ok(Self(body))
        } else if content_type.starts_with("multipart/form-data") {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(multipart_rejection)?;
            let mut body = IncantationRequest::default();
            while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
                if field.name() == Some("incantation") {
                    body.incantation = Some(field.text().await.map_err(multipart_error)?);
                }
            }
            Ok(Self(body))
        } else {
            Ok(Self(IncantationRequest::default()))
        }
    }
}

/// POST /process-incantation/ - unique consonants of the incantation, in order
pub async fn incantation_post(
    Extension(user): Extension<ValidatedUser>,
    IncantationBody(body): IncantationBody,
) -> ApiResult<ConsonantsResponse> {
    let text = body.incantation.unwrap_or_default();

    let consonants = incantation::process(&text).map_err(|e| {
        tracing::debug!("Rejected incantation from {}: {}", user.username, e);
        ApiError::from(e)
    })?;

    Ok(ApiResponse::success(ConsonantsResponse { consonants }))
}
