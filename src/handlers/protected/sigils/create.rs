use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Extension,
};
use chrono::Utc;
use uuid::Uuid;

use crate::api::form::{ImageUpload, SigilSubmission};
use crate::api::SigilResponse;
use crate::app::AppState;
use crate::error::ApiError;
use crate::handlers::protected::utils::{multipart_error, multipart_rejection};
use crate::middleware::{ApiResponse, ApiResult, ValidatedUser};

/// Multipart part carrying the image file
const IMAGE_FIELD: &str = "image";

/// POST /sigils/ - create a sigil from a multipart submission
///
/// The owner is always the authenticated caller. If the row can't be
/// written, the image saved for it is removed again.
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<ValidatedUser>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<SigilResponse> {
    let submission = read_submission(multipart.map_err(multipart_rejection)?).await?;

    let mut keys: Vec<&str> = submission.fields.keys().map(String::as_str).collect();
    keys.sort_unstable();
    tracing::debug!(
        "Incoming sigil fields from {}: {:?} (image: {})",
        user.username,
        keys,
        submission.image.is_some()
    );

    let valid = submission
        .validate()
        .map_err(|errors| ApiError::validation_error("Invalid sigil submission", Some(errors)))?;

    let id = Uuid::new_v4();
    let image = state.media.save(id, valid.image_kind, &valid.image_bytes).await?;
    let record = valid.form.into_record(id, user.id, image.clone(), Utc::now());

    tracing::debug!(
        "Saving sigil {} - burned: {}, created_lat: {:?}, burned_lat: {:?}",
        id,
        record.is_burned,
        record.created_lat,
        record.burned_lat
    );

    let stored = match state.sigils.insert(record).await {
        Ok(stored) => stored,
        Err(e) => {
            state.media.remove(&image).await;
            return Err(e.into());
        }
    };

    tracing::info!("User {} created sigil {}", user.username, stored.id);
    Ok(ApiResponse::created(SigilResponse::from_record(stored, &state.media)))
}

async fn read_submission(mut multipart: Multipart) -> Result<SigilSubmission, ApiError> {
    let mut submission = SigilSubmission::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == IMAGE_FIELD {
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(multipart_error)?;
            submission.image = Some(ImageUpload {
                file_name,
                content_type,
                bytes: bytes.to_vec(),
            });
        } else {
            let value = field.text().await.map_err(multipart_error)?;
            submission.fields.insert(name, value);
        }
    }

    Ok(submission)
}
