use std::collections::HashMap;

use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
    Form,
};
use portal_core::models::{FormFields, SubmissionInput, Upload};
use portal_core::validation::rules::ATTACHMENT_FIELD;

use crate::error::ApiError;

/// A submitted intake form, read from either `multipart/form-data` or
/// `application/x-www-form-urlencoded`.
#[derive(Debug)]
pub struct IntakeForm(pub SubmissionInput);

#[async_trait]
impl<S> FromRequest<S> for IntakeForm
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("multipart/form-data"));

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::Malformed(e.body_text()))?;
            return read_multipart(multipart).await.map(IntakeForm);
        }

        let Form(values) = Form::<HashMap<String, String>>::from_request(req, state)
            .await
            .map_err(|e| ApiError::Malformed(e.body_text()))?;
        Ok(IntakeForm(SubmissionInput::new(values.into(), None)))
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<SubmissionInput, ApiError> {
    let mut fields = FormFields::new();
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Malformed(e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == ATTACHMENT_FIELD {
            let file_name = base_name(field.file_name().unwrap_or_default());
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::Malformed(e.body_text()))?;
            // Browsers send an empty part when no file was chosen.
            if !bytes.is_empty() {
                upload = Some(Upload::new(file_name, content_type, bytes));
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| ApiError::Malformed(e.body_text()))?;
        fields.insert(name, value);
    }

    Ok(SubmissionInput::new(fields, upload))
}

/// Drops any directory part a client put in the file name.
fn base_name(raw: &str) -> String {
    let name = raw.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    if name.is_empty() {
        "attachment".to_string()
    } else {
        name.to_string()
    }
}
