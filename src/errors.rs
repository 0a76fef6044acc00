use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invalid or expired access token")]
    InvalidToken,

    #[error("project not found")]
    ProjectNotFound,

    #[error("recording not found")]
    RecordingNotFound,

    #[error("recording already processed")]
    AlreadyProcessed,

    #[error("no override meeting id supplied")]
    MissingOverrideId,

    #[error("override meeting not previewed")]
    PreviewRequired,

    #[error("meeting {0} not found")]
    MeetingNotFound(String),

    #[error("meeting lookup failed: {0}")]
    Lookup(String),

    #[error("persistence failure: {0}")]
    Persistence(#[from] anyhow::Error),
}

impl AppError {
    /// Warnings leave state untouched and ask the user to correct the input.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            AppError::MissingOverrideId | AppError::PreviewRequired | AppError::MeetingNotFound(_)
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, code, msg) = match &self {
            AppError::Validation(reason) => (
                StatusCode::BAD_REQUEST,
                "invalid_request_error",
                "validation_failed",
                reason.clone(),
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "authentication_error",
                "invalid_token",
                "Invalid or expired access token.".to_string(),
            ),
            AppError::ProjectNotFound => (
                StatusCode::NOT_FOUND,
                "not_found_error",
                "project_not_found",
                "project not found".to_string(),
            ),
            AppError::RecordingNotFound => (
                StatusCode::NOT_FOUND,
                "not_found_error",
                "recording_not_found",
                "recording not found".to_string(),
            ),
            AppError::AlreadyProcessed => (
                StatusCode::CONFLICT,
                "conflict_error",
                "already_processed",
                "this recording has already been reviewed".to_string(),
            ),
            AppError::MissingOverrideId => (
                StatusCode::BAD_REQUEST,
                "invalid_request_error",
                "missing_meeting_id",
                "Please enter a Meeting ID first".to_string(),
            ),
            AppError::PreviewRequired => (
                StatusCode::CONFLICT,
                "conflict_error",
                "preview_required",
                "Please load the meeting first to verify its details before submitting."
                    .to_string(),
            ),
            AppError::MeetingNotFound(id) => (
                StatusCode::NOT_FOUND,
                "not_found_error",
                "meeting_not_found",
                format!("no meeting found with ID {}", id),
            ),
            AppError::Lookup(e) => {
                tracing::warn!("Meeting lookup error: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "upstream_error",
                    "lookup_failed",
                    "meeting lookup failed".to_string(),
                )
            }
            AppError::Persistence(e) => {
                tracing::error!("Persistence error: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "persistence_failed",
                    "could not save changes, please try again".to_string(),
                )
            }
        };

        let error_type = if self.is_warning() { "warning" } else { kind };

        let body = Json(json!({
            "error": {
                "message": msg,
                "type": error_type,
                "code": code,
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (AppError::InvalidToken, StatusCode::UNAUTHORIZED),
            (AppError::RecordingNotFound, StatusCode::NOT_FOUND),
            (AppError::AlreadyProcessed, StatusCode::CONFLICT),
            (AppError::MissingOverrideId, StatusCode::BAD_REQUEST),
            (AppError::PreviewRequired, StatusCode::CONFLICT),
            (AppError::Lookup("down".into()), StatusCode::BAD_GATEWAY),
            (
                AppError::Persistence(anyhow::anyhow!("insert returned no row")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[tokio::test]
    async fn test_response_type_follows_warning_class() {
        let cases = [
            AppError::MissingOverrideId,
            AppError::PreviewRequired,
            AppError::MeetingNotFound("1".into()),
            AppError::RecordingNotFound,
            AppError::AlreadyProcessed,
            AppError::Validation("x".into()),
        ];
        for err in cases {
            let warning = err.is_warning();
            let bytes = axum::body::to_bytes(err.into_response().into_body(), usize::MAX)
                .await
                .unwrap();
            let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(body["error"]["type"] == "warning", warning, "{}", body);
        }
    }

    #[test]
    fn test_warnings() {
        assert!(AppError::MissingOverrideId.is_warning());
        assert!(AppError::PreviewRequired.is_warning());
        assert!(!AppError::InvalidToken.is_warning());
        assert!(!AppError::AlreadyProcessed.is_warning());
    }
}
