use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::StatusCode;

use crate::error::ApiError;

/// Map a failed multipart read; bodies over the configured limit become 413
pub fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large(err.body_text())
    } else {
        ApiError::bad_request(err.body_text())
    }
}

pub fn multipart_rejection(rejection: MultipartRejection) -> ApiError {
    ApiError::bad_request(rejection.body_text())
}

/// Clamp a requested page size to `max`, flooring negatives at zero
pub fn clamp_limit(requested: Option<i64>, max: Option<i64>) -> Option<i64> {
    requested.map(|limit| match max {
        Some(max) => limit.clamp(0, max.max(0)),
        None => limit.max(0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_requested_limits_only() {
        assert_eq!(clamp_limit(None, Some(100)), None);
        assert_eq!(clamp_limit(Some(50), Some(100)), Some(50));
        assert_eq!(clamp_limit(Some(500), Some(100)), Some(100));
        assert_eq!(clamp_limit(Some(-3), Some(100)), Some(0));
        assert_eq!(clamp_limit(Some(500), None), Some(500));
    }
}
