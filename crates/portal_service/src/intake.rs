//! The write path for citizen submissions.
//!
//! Order matters and is never reversed:
//! 1. insert the submission row (failure aborts everything),
//! 2. upload the attachment bytes, if any,
//! 3. insert the attachment metadata row.
//!
//! Steps 2 and 3 can fail without undoing step 1. The receipt says so, and the
//! caller decides how to word it.

use portal_core::models::{
    AnonymousComplaint, AttachmentOwner, AttachmentRecord, Complaint, Feedback, SubmissionKind,
    Upload,
};
use portal_core::{attachment_path, ReferenceNumber, VerificationCode};
use portal_db::{Filter, NewRecord, StoreError, Table};
use time::OffsetDateTime;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::{IntakeError, Result, StorageError};
use crate::IntakeService;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentOutcome {
    NotProvided,
    Stored { attachment_id: Uuid, path: String },
    /// The submission was saved, its attachment was not.
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntakeReceipt {
    pub kind: SubmissionKind,
    pub id: Uuid,
    pub reference_number: Option<ReferenceNumber>,
    pub attachment: AttachmentOutcome,
}

impl IntakeReceipt {
    pub fn attachment_failed(&self) -> bool {
        self.attachment == AttachmentOutcome::Failed
    }
}

impl IntakeService {
    pub async fn submit_complaint(
        &self,
        complaint: Complaint,
        upload: Option<Upload>,
    ) -> Result<IntakeReceipt> {
        self.write(SubmissionKind::Complaint, NewRecord::Complaint(complaint), None, upload)
            .await
    }

    pub async fn submit_anonymous(
        &self,
        complaint: AnonymousComplaint,
        upload: Option<Upload>,
    ) -> Result<IntakeReceipt> {
        let reference = self.fresh_reference(&complaint.verification_code).await;
        let record = complaint.into_record(reference.clone());
        self.write(
            SubmissionKind::AnonymousComplaint,
            NewRecord::AnonymousComplaint(record),
            Some(reference),
            upload,
        )
        .await
    }

    pub async fn submit_feedback(
        &self,
        feedback: Feedback,
        upload: Option<Upload>,
    ) -> Result<IntakeReceipt> {
        self.write(SubmissionKind::Feedback, NewRecord::Feedback(feedback), None, upload)
            .await
    }

    async fn write(
        &self,
        kind: SubmissionKind,
        record: NewRecord,
        reference_number: Option<ReferenceNumber>,
        upload: Option<Upload>,
    ) -> Result<IntakeReceipt> {
        if let Some(department_id) = record.department_id() {
            self.ensure_department(department_id).await?;
        }

        let id = self
            .within(self.records.insert(&record), StoreError::Timeout)
            .await
            .map_err(|e| {
                error!(kind = %kind, error = %e, "failed to record submission");
                IntakeError::PrimaryWrite(e)
            })?;
        info!(kind = %kind, %id, reference = ?reference_number.as_ref().map(ReferenceNumber::as_str), "submission recorded");

        let attachment = match upload.filter(|u| !u.is_empty()) {
            Some(upload) => self.attach(AttachmentOwner::new(kind, id), upload).await,
            None => AttachmentOutcome::NotProvided,
        };

        Ok(IntakeReceipt {
            kind,
            id,
            reference_number,
            attachment,
        })
    }

    async fn attach(&self, owner: AttachmentOwner, upload: Upload) -> AttachmentOutcome {
        let unix_millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
        let path = attachment_path(
            owner.kind(),
            owner.id(),
            upload.extension().as_deref(),
            unix_millis,
        );

        let stored = self
            .within(
                self.attachments
                    .store(&path, upload.bytes.clone(), &upload.content_type),
                StorageError::Timeout,
            )
            .await;
        if let Err(e) = stored {
            warn!(owner = %owner.id(), %path, error = %e, "attachment upload failed; submission kept");
            return AttachmentOutcome::Failed;
        }

        let metadata = NewRecord::Attachment(AttachmentRecord {
            owner,
            file_size: i64::try_from(upload.len()).unwrap_or(i64::MAX),
            file_name: upload.file_name,
            file_path: path.clone(),
            file_type: upload.content_type,
        });
        match self
            .within(self.records.insert(&metadata), StoreError::Timeout)
            .await
        {
            Ok(attachment_id) => {
                info!(owner = %owner.id(), %attachment_id, %path, "attachment stored");
                AttachmentOutcome::Stored {
                    attachment_id,
                    path,
                }
            }
            Err(e) => {
                // The object stays in the bucket without a metadata row.
                warn!(owner = %owner.id(), %path, error = %e, "attachment metadata insert failed; submission kept");
                AttachmentOutcome::Failed
            }
        }
    }

    async fn ensure_department(&self, id: Uuid) -> Result<()> {
        let filter = Filter::new().eq("id", id.to_string()).limit(1);
        let rows = self
            .within(self.records.query(Table::Departments, &filter), StoreError::Timeout)
            .await
            .map_err(IntakeError::Query)?;

        if rows.is_empty() {
            debug!(department = %id, "submission names an unknown department");
            return Err(IntakeError::UnknownDepartment(id));
        }
        Ok(())
    }

    /// Draws reference numbers until one is not in use, up to the configured
    /// number of attempts. After that the last candidate is used anyway.
    async fn fresh_reference(&self, code: &VerificationCode) -> ReferenceNumber {
        let attempts = self.options.reference_attempts.max(1);
        let mut candidate = ReferenceNumber::generate(code);

        for attempt in 1..=attempts {
            let filter = Filter::new()
                .eq("reference_number", candidate.as_str())
                .limit(1);
            let taken = self
                .within(
                    self.records.query(Table::AnonymousComplaints, &filter),
                    StoreError::Timeout,
                )
                .await;

            match taken {
                Ok(rows) if rows.is_empty() => return candidate,
                Ok(_) => debug!(attempt, reference = %candidate, "reference number in use"),
                Err(e) => {
                    // The insert that follows will surface a real outage.
                    warn!(error = %e, "could not check reference number; using it unchecked");
                    return candidate;
                }
            }

            if attempt < attempts {
                candidate = ReferenceNumber::generate(code);
            }
        }

        warn!(reference = %candidate, attempts, "no unused reference number found; accepting a duplicate");
        candidate
    }
}
