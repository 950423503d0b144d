use axum::{extract::State, Json};
use portal_core::validation::schema::status_lookup_validator;
use portal_core::{ReferenceNumber, ValidationErrors, VerificationCode};
use portal_service::AnonymousStatus;
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::form::IntakeForm;
use crate::state::AppState;

/// Same answer for an unknown reference and a wrong code.
pub const NOT_FOUND_MESSAGE: &str =
    "No complaint matches that reference number and verification code.";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub complaint: AnonymousStatus,
}

pub async fn lookup_anonymous(
    State(state): State<AppState>,
    IntakeForm(input): IntakeForm,
) -> ApiResult<Json<StatusResponse>> {
    status_lookup_validator().validate(&input)?;

    let fields = &input.fields;
    let reference = fields
        .get("reference_number")
        .and_then(ReferenceNumber::parse)
        .ok_or_else(|| {
            ValidationErrors::single(
                "reference_number",
                "Reference number must look like ANO-1234-AB",
            )
        })?;
    let code = VerificationCode::new(fields.get("verification_code").unwrap_or_default());

    match state.intake.lookup_anonymous(&reference, &code).await? {
        Some(complaint) => Ok(Json(StatusResponse {
            success: true,
            message: format!("Your complaint is {}.", complaint.status.replace('_', " ")),
            complaint,
        })),
        None => Err(ApiError::NotFound(NOT_FOUND_MESSAGE.to_string())),
    }
}
