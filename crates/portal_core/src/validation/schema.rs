//! The canonical form schemas. Every entry point (HTTP intake, CLI) validates
//! through these, so thresholds live in exactly one place.

use uuid::Uuid;

use super::rules::{
    parse_date, AttachmentSize, CharsBetween, EmailShape, IntegerBetween, IsoDate,
    LeadingLetters, MinChars, PhoneShape, Required, UuidShape,
};
use super::{ValidationEngine, ValidationErrors};
use crate::identifiers::VerificationCode;
use crate::models::{
    AnonymousComplaint, Complaint, Feedback, FormFields, SubmissionInput, SubmissionKind,
};

pub const MIN_DESCRIPTION_CHARS: usize = 20;
pub const VERIFICATION_CODE_MIN: usize = 4;
pub const VERIFICATION_CODE_MAX: usize = 10;
pub const RATING_MIN: i64 = 1;
pub const RATING_MAX: i64 = 5;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_upload_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

pub fn complaint_validator(limits: Limits) -> ValidationEngine {
    ValidationEngine::new()
        .add_rule(Required { field: "complaint_type", label: "Complaint type" })
        .add_rule(Required { field: "description", label: "Description" })
        .add_rule(MinChars {
            field: "description",
            label: "Description",
            min: MIN_DESCRIPTION_CHARS,
        })
        .add_rule(IsoDate { field: "incident_date", label: "Incident date" })
        .add_rule(Required { field: "full_name", label: "Full name" })
        .add_rule(Required { field: "phone", label: "Phone number" })
        .add_rule(PhoneShape { field: "phone" })
        .add_rule(EmailShape { field: "email" })
        .add_rule(UuidShape { field: "department_id", label: "Department" })
        .add_rule(AttachmentSize { max_bytes: limits.max_upload_bytes })
}

pub fn anonymous_validator(limits: Limits) -> ValidationEngine {
    ValidationEngine::new()
        .add_rule(Required { field: "category", label: "Category" })
        .add_rule(Required { field: "details", label: "Details" })
        .add_rule(MinChars {
            field: "details",
            label: "Details",
            min: MIN_DESCRIPTION_CHARS,
        })
        .add_rule(Required { field: "location", label: "Location" })
        .add_rule(IsoDate { field: "incident_date", label: "Incident date" })
        .add_rule(Required { field: "verification_code", label: "Verification code" })
        .add_rule(CharsBetween {
            field: "verification_code",
            label: "Verification code",
            min: VERIFICATION_CODE_MIN,
            max: VERIFICATION_CODE_MAX,
        })
        .add_rule(LeadingLetters {
            field: "verification_code",
            label: "Verification code",
            count: 2,
        })
        .add_rule(UuidShape { field: "department_id", label: "Department" })
        .add_rule(AttachmentSize { max_bytes: limits.max_upload_bytes })
}

pub fn feedback_validator(limits: Limits) -> ValidationEngine {
    ValidationEngine::new()
        .add_rule(Required { field: "feedback_service", label: "Service" })
        .add_rule(Required { field: "rating", label: "Rating" })
        .add_rule(IntegerBetween {
            field: "rating",
            label: "Rating",
            min: RATING_MIN,
            max: RATING_MAX,
        })
        .add_rule(Required { field: "feedback_details", label: "Feedback details" })
        .add_rule(EmailShape { field: "email" })
        .add_rule(UuidShape { field: "department_id", label: "Department" })
        .add_rule(AttachmentSize { max_bytes: limits.max_upload_bytes })
}

/// Rules for the anonymous complaint status lookup form.
pub fn status_lookup_validator() -> ValidationEngine {
    ValidationEngine::new()
        .add_rule(Required { field: "reference_number", label: "Reference number" })
        .add_rule(Required { field: "verification_code", label: "Verification code" })
        .add_rule(CharsBetween {
            field: "verification_code",
            label: "Verification code",
            min: VERIFICATION_CODE_MIN,
            max: VERIFICATION_CODE_MAX,
        })
}

pub fn validator_for(kind: SubmissionKind, limits: Limits) -> ValidationEngine {
    match kind {
        SubmissionKind::Complaint => complaint_validator(limits),
        SubmissionKind::AnonymousComplaint => anonymous_validator(limits),
        SubmissionKind::Feedback => feedback_validator(limits),
    }
}

pub fn validate_complaint(input: &SubmissionInput, limits: Limits) -> Result<Complaint, ValidationErrors> {
    complaint_validator(limits).validate(input)?;
    let f = &input.fields;
    Ok(Complaint {
        complaint_type: required(f, "complaint_type")?,
        description: required(f, "description")?,
        location: optional(f, "location"),
        incident_date: f.get("incident_date").and_then(parse_date),
        full_name: required(f, "full_name")?,
        phone: required(f, "phone")?,
        email: optional(f, "email"),
        department_id: department(f),
    })
}

pub fn validate_anonymous(
    input: &SubmissionInput,
    limits: Limits,
) -> Result<AnonymousComplaint, ValidationErrors> {
    anonymous_validator(limits).validate(input)?;
    let f = &input.fields;
    Ok(AnonymousComplaint {
        category: required(f, "category")?,
        details: required(f, "details")?,
        location: required(f, "location")?,
        incident_date: f.get("incident_date").and_then(parse_date),
        verification_code: VerificationCode::new(required(f, "verification_code")?),
        department_id: department(f),
    })
}

pub fn validate_feedback(input: &SubmissionInput, limits: Limits) -> Result<Feedback, ValidationErrors> {
    feedback_validator(limits).validate(input)?;
    let f = &input.fields;
    let rating = f
        .get("rating")
        .and_then(|r| r.parse::<u8>().ok())
        .ok_or_else(|| ValidationErrors::single("rating", "Rating is required"))?;
    Ok(Feedback {
        service: required(f, "feedback_service")?,
        rating,
        details: required(f, "feedback_details")?,
        full_name: optional(f, "full_name"),
        email: optional(f, "email"),
        phone: optional(f, "phone"),
        department_id: department(f),
    })
}

fn required(fields: &FormFields, name: &str) -> Result<String, ValidationErrors> {
    fields
        .get(name)
        .map(str::to_owned)
        .ok_or_else(|| ValidationErrors::single(name, format!("{name} is required")))
}

fn optional(fields: &FormFields, name: &str) -> Option<String> {
    fields.get(name).map(str::to_owned)
}

fn department(fields: &FormFields) -> Option<Uuid> {
    fields.get("department_id").and_then(|v| Uuid::parse_str(v).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(pairs: &[(&str, &str)]) -> SubmissionInput {
        SubmissionInput::new(pairs.iter().copied().collect(), None)
    }

    #[test]
    fn empty_anonymous_form_reports_every_required_field() {
        let err = validate_anonymous(&input(&[]), Limits::default()).unwrap_err();
        let fields: Vec<_> = err.fields().collect();
        assert_eq!(fields, vec!["category", "details", "location", "verification_code"]);
    }

    #[test]
    fn each_field_reports_once() {
        let err = validate_anonymous(
            &input(&[
                ("category", "roads"),
                ("details", "short"),
                ("location", "Main St"),
                ("verification_code", "1"),
            ]),
            Limits::default(),
        )
        .unwrap_err();
        assert_eq!(err.errors().len(), 2);
        assert_eq!(err.errors()[0].field, "details");
        assert!(err.errors()[0].message.contains("20"));
        assert_eq!(err.errors()[1].field, "verification_code");
        assert!(err.errors()[1].message.contains("between 4 and 10"));
    }

    #[test]
    fn verification_code_bounds() {
        let base = [
            ("category", "roads"),
            ("details", "A pothole has been open for three weeks"),
            ("location", "Main St"),
        ];
        for (code, ok) in [("ab", false), ("abcd", true), ("abcdefghij", true), ("abcdefghijk", false), ("12ab", false)] {
            let mut pairs = base.to_vec();
            pairs.push(("verification_code", code));
            let result = validate_anonymous(&input(&pairs), Limits::default());
            assert_eq!(result.is_ok(), ok, "code {code}");
        }
    }

    #[test]
    fn valid_anonymous_is_normalized() {
        let complaint = validate_anonymous(
            &input(&[
                ("category", " roads "),
                ("details", "A pothole has been open for three weeks"),
                ("location", "Main St"),
                ("incident_date", "2024-05-01"),
                ("verification_code", "kx42"),
                ("department_id", ""),
            ]),
            Limits::default(),
        )
        .unwrap();
        assert_eq!(complaint.category, "roads");
        assert_eq!(complaint.incident_date.map(|d| d.to_string()).as_deref(), Some("2024-05-01"));
        assert_eq!(complaint.department_id, None);
    }

    #[test]
    fn complaint_requires_contact_details() {
        let err = validate_complaint(
            &input(&[
                ("complaint_type", "noise"),
                ("description", "Construction noise every night after 11pm"),
                ("email", "nope"),
            ]),
            Limits::default(),
        )
        .unwrap_err();
        let fields: Vec<_> = err.fields().collect();
        assert_eq!(fields, vec!["full_name", "phone", "email"]);
    }

    #[test]
    fn feedback_scenario_passes() {
        let feedback = validate_feedback(
            &input(&[
                ("rating", "5"),
                ("feedback_service", "water"),
                ("feedback_details", "Great service"),
            ]),
            Limits::default(),
        )
        .unwrap();
        assert_eq!(feedback.rating, 5);
        assert_eq!(feedback.service, "water");
        assert_eq!(feedback.full_name, None);
    }

    #[test]
    fn feedback_rating_out_of_range() {
        let err = validate_feedback(
            &input(&[("rating", "0"), ("feedback_service", "water")]),
            Limits::default(),
        )
        .unwrap_err();
        let fields: Vec<_> = err.fields().collect();
        assert_eq!(fields, vec!["rating", "feedback_details"]);
    }
}
