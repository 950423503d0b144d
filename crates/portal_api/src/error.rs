use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use portal_core::{FieldError, ValidationErrors};
use portal_service::IntakeError;
use serde::Serialize;
use thiserror::Error;

pub const GENERIC_FAILURE: &str =
    "We could not process your submission right now. Please try again later.";

/// Body of every intake response, success or not.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl SubmissionResponse {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            ..Self::default()
        }
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Malformed request: {0}")]
    Malformed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Intake(#[from] IntakeError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Detail goes to the log; the caller only ever sees a safe message.
        let (status, body) = match self {
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                SubmissionResponse {
                    errors: Some(errors.into_errors()),
                    ..SubmissionResponse::failure("Please correct the highlighted fields and try again.")
                },
            ),
            ApiError::Malformed(detail) => {
                tracing::warn!(%detail, "rejected malformed request");
                (
                    StatusCode::BAD_REQUEST,
                    SubmissionResponse::failure("The submitted form could not be read."),
                )
            }
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, SubmissionResponse::failure(message)),
            ApiError::Intake(IntakeError::UnknownDepartment(id)) => {
                tracing::info!(department = %id, "rejected submission for unknown department");
                let errors = ValidationErrors::single("department_id", "Department does not exist");
                return ApiError::Validation(errors).into_response();
            }
            ApiError::Intake(e) => {
                tracing::error!(error = %e, "intake failed");
                (StatusCode::INTERNAL_SERVER_ERROR, SubmissionResponse::failure(GENERIC_FAILURE))
            }
            ApiError::Internal(detail) => {
                tracing::error!(%detail, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, SubmissionResponse::failure(GENERIC_FAILURE))
            }
        };

        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_keys_are_omitted() {
        let body = serde_json::to_value(SubmissionResponse {
            success: true,
            message: "ok".into(),
            reference_number: Some("ANO-1234-AB".into()),
            ..SubmissionResponse::default()
        })
        .unwrap();
        assert_eq!(
            body,
            json!({"success": true, "message": "ok", "referenceNumber": "ANO-1234-AB"})
        );
    }

    #[test]
    fn status_codes_follow_the_error_class() {
        let validation = ApiError::from(ValidationErrors::single("rating", "Rating is required"));
        assert_eq!(validation.into_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Internal("boom".into()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::NotFound("nope".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        let unknown = ApiError::from(IntakeError::UnknownDepartment(uuid::Uuid::nil()));
        assert_eq!(unknown.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
