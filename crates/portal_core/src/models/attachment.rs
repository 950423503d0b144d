use serde::Serialize;
use uuid::Uuid;

use super::submission::SubmissionKind;

/// The submission an attachment belongs to. Exactly one owner, always.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentOwner {
    Complaint(Uuid),
    AnonymousComplaint(Uuid),
    Feedback(Uuid),
}

impl AttachmentOwner {
    pub fn new(kind: SubmissionKind, id: Uuid) -> Self {
        match kind {
            SubmissionKind::Complaint => AttachmentOwner::Complaint(id),
            SubmissionKind::AnonymousComplaint => AttachmentOwner::AnonymousComplaint(id),
            SubmissionKind::Feedback => AttachmentOwner::Feedback(id),
        }
    }

    pub fn kind(&self) -> SubmissionKind {
        match self {
            AttachmentOwner::Complaint(_) => SubmissionKind::Complaint,
            AttachmentOwner::AnonymousComplaint(_) => SubmissionKind::AnonymousComplaint,
            AttachmentOwner::Feedback(_) => SubmissionKind::Feedback,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            AttachmentOwner::Complaint(id)
            | AttachmentOwner::AnonymousComplaint(id)
            | AttachmentOwner::Feedback(id) => *id,
        }
    }

    /// Foreign key column that carries the owner id.
    pub fn column(&self) -> &'static str {
        match self {
            AttachmentOwner::Complaint(_) => "complaint_id",
            AttachmentOwner::AnonymousComplaint(_) => "anonymous_complaint_id",
            AttachmentOwner::Feedback(_) => "feedback_id",
        }
    }
}

/// Metadata row describing a stored attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachmentRecord {
    #[serde(skip)]
    pub owner: AttachmentOwner,
    pub file_name: String,
    pub file_path: String,
    pub file_type: String,
    pub file_size: i64,
}

impl AttachmentRecord {
    pub fn complaint_id(&self) -> Option<Uuid> {
        match self.owner {
            AttachmentOwner::Complaint(id) => Some(id),
            _ => None,
        }
    }

    pub fn anonymous_complaint_id(&self) -> Option<Uuid> {
        match self.owner {
            AttachmentOwner::AnonymousComplaint(id) => Some(id),
            _ => None,
        }
    }

    pub fn feedback_id(&self) -> Option<Uuid> {
        match self.owner {
            AttachmentOwner::Feedback(id) => Some(id),
            _ => None,
        }
    }
}
