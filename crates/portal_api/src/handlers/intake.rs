use axum::{extract::State, Json};
use portal_core::models::SubmissionKind;
use portal_core::validation::schema::{validate_anonymous, validate_complaint, validate_feedback};
use portal_service::IntakeReceipt;

use crate::error::{ApiResult, SubmissionResponse};
use crate::form::IntakeForm;
use crate::state::AppState;

const ATTACHMENT_CAVEAT: &str =
    " However, your attachment could not be uploaded. Your submission was still recorded.";

pub async fn submit_complaint(
    State(state): State<AppState>,
    IntakeForm(input): IntakeForm,
) -> ApiResult<Json<SubmissionResponse>> {
    let complaint = validate_complaint(&input, state.limits)?;
    let receipt = state.intake.submit_complaint(complaint, input.upload).await?;
    Ok(Json(accepted(&receipt)))
}

pub async fn submit_anonymous(
    State(state): State<AppState>,
    IntakeForm(input): IntakeForm,
) -> ApiResult<Json<SubmissionResponse>> {
    let complaint = validate_anonymous(&input, state.limits)?;
    let receipt = state.intake.submit_anonymous(complaint, input.upload).await?;
    Ok(Json(accepted(&receipt)))
}

pub async fn submit_feedback(
    State(state): State<AppState>,
    IntakeForm(input): IntakeForm,
) -> ApiResult<Json<SubmissionResponse>> {
    let feedback = validate_feedback(&input, state.limits)?;
    let receipt = state.intake.submit_feedback(feedback, input.upload).await?;
    Ok(Json(accepted(&receipt)))
}

fn accepted(receipt: &IntakeReceipt) -> SubmissionResponse {
    let mut message = match receipt.kind {
        SubmissionKind::Complaint => {
            "Your complaint has been submitted. We will contact you about its progress.".to_string()
        }
        SubmissionKind::AnonymousComplaint => {
            "Your anonymous complaint has been submitted. Keep your reference number and \
             verification code to check its status."
                .to_string()
        }
        SubmissionKind::Feedback => "Thank you for your feedback.".to_string(),
    };
    if receipt.attachment_failed() {
        message.push_str(ATTACHMENT_CAVEAT);
    }

    SubmissionResponse {
        success: true,
        message,
        reference_number: receipt
            .reference_number
            .as_ref()
            .map(|r| r.as_str().to_string()),
        // Anonymous submitters get the reference number only.
        id: (receipt.kind != SubmissionKind::AnonymousComplaint).then(|| receipt.id.to_string()),
        errors: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_service::AttachmentOutcome;
    use uuid::Uuid;

    fn receipt(kind: SubmissionKind, attachment: AttachmentOutcome) -> IntakeReceipt {
        IntakeReceipt {
            kind,
            id: Uuid::new_v4(),
            reference_number: None,
            attachment,
        }
    }

    #[test]
    fn attachment_failure_is_a_distinct_success() {
        let clean = accepted(&receipt(SubmissionKind::Complaint, AttachmentOutcome::NotProvided));
        let caveat = accepted(&receipt(SubmissionKind::Complaint, AttachmentOutcome::Failed));

        assert!(clean.success && caveat.success);
        assert_ne!(clean.message, caveat.message);
        assert!(caveat.message.contains("attachment could not be uploaded"));
        assert!(caveat.id.is_some());
    }

    #[test]
    fn anonymous_receipts_do_not_expose_the_row_id() {
        let body = accepted(&receipt(
            SubmissionKind::AnonymousComplaint,
            AttachmentOutcome::NotProvided,
        ));
        assert!(body.id.is_none());
    }
}
