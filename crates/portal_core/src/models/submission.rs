use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use time::Date;
use uuid::Uuid;

use crate::identifiers::{CodeDigest, ReferenceNumber, VerificationCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionKind {
    Complaint,
    AnonymousComplaint,
    Feedback,
}

impl SubmissionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionKind::Complaint => "complaint",
            SubmissionKind::AnonymousComplaint => "anonymous_complaint",
            SubmissionKind::Feedback => "feedback",
        }
    }

    /// Top-level folder for this kind's attachments in object storage.
    pub fn storage_dir(&self) -> &'static str {
        match self {
            SubmissionKind::Complaint => "complaints",
            SubmissionKind::AnonymousComplaint => "anonymous-complaints",
            SubmissionKind::Feedback => "feedback",
        }
    }
}

impl fmt::Display for SubmissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubmissionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "complaint" => Ok(SubmissionKind::Complaint),
            "anonymous" | "anonymous_complaint" | "anonymous-complaint" => {
                Ok(SubmissionKind::AnonymousComplaint)
            }
            "feedback" => Ok(SubmissionKind::Feedback),
            other => Err(format!("unknown submission kind '{other}'")),
        }
    }
}

/// A named complaint, validated and ready to be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Complaint {
    pub complaint_type: String,
    pub description: String,
    pub location: Option<String>,
    pub incident_date: Option<Date>,
    pub full_name: String,
    pub phone: String,
    pub email: Option<String>,
    pub department_id: Option<Uuid>,
}

/// A validated anonymous complaint. Still holds the plaintext code; turn it
/// into an [`AnonymousComplaintRecord`] before it goes anywhere near storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnonymousComplaint {
    pub category: String,
    pub details: String,
    pub location: String,
    pub incident_date: Option<Date>,
    pub verification_code: VerificationCode,
    pub department_id: Option<Uuid>,
}

impl AnonymousComplaint {
    pub fn into_record(self, reference_number: ReferenceNumber) -> AnonymousComplaintRecord {
        AnonymousComplaintRecord {
            verification_code_hash: self.verification_code.digest(),
            reference_number,
            category: self.category,
            details: self.details,
            location: self.location,
            incident_date: self.incident_date,
            department_id: self.department_id,
        }
    }
}

/// The persisted shape of an anonymous complaint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnonymousComplaintRecord {
    pub reference_number: ReferenceNumber,
    pub category: String,
    pub details: String,
    pub location: String,
    pub incident_date: Option<Date>,
    pub verification_code_hash: CodeDigest,
    pub department_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub service: String,
    pub rating: u8,
    pub details: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department_id: Option<Uuid>,
}
