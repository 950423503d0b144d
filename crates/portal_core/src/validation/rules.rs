use once_cell::sync::Lazy;
use regex::Regex;
use time::macros::format_description;
use time::Date;
use uuid::Uuid;

use crate::models::SubmissionInput;
use crate::validation::ValidationRule;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9+()\-\s]{7,20}$").expect("phone pattern is valid"));

pub fn parse_date(value: &str) -> Option<Date> {
    Date::parse(value, format_description!("[year]-[month]-[day]")).ok()
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

// =========================================================================
// Presence
// =========================================================================
pub struct Required {
    pub field: &'static str,
    pub label: &'static str,
}

impl ValidationRule for Required {
    fn field(&self) -> &str {
        self.field
    }

    fn check(&self, input: &SubmissionInput) -> Option<String> {
        (!input.fields.contains(self.field)).then(|| format!("{} is required", self.label))
    }
}

// =========================================================================
// Text length, counted in characters of the trimmed value
// =========================================================================
pub struct MinChars {
    pub field: &'static str,
    pub label: &'static str,
    pub min: usize,
}

impl ValidationRule for MinChars {
    fn field(&self) -> &str {
        self.field
    }

    fn check(&self, input: &SubmissionInput) -> Option<String> {
        let value = input.fields.get(self.field)?;
        (char_len(value) < self.min)
            .then(|| format!("{} must be at least {} characters", self.label, self.min))
    }
}

pub struct CharsBetween {
    pub field: &'static str,
    pub label: &'static str,
    pub min: usize,
    pub max: usize,
}

impl ValidationRule for CharsBetween {
    fn field(&self) -> &str {
        self.field
    }

    fn check(&self, input: &SubmissionInput) -> Option<String> {
        let len = char_len(input.fields.get(self.field)?);
        (len < self.min || len > self.max).then(|| {
            format!(
                "{} must be between {} and {} characters",
                self.label, self.min, self.max
            )
        })
    }
}

/// The first `count` characters must be ASCII letters.
pub struct LeadingLetters {
    pub field: &'static str,
    pub label: &'static str,
    pub count: usize,
}

impl ValidationRule for LeadingLetters {
    fn field(&self) -> &str {
        self.field
    }

    fn check(&self, input: &SubmissionInput) -> Option<String> {
        let value = input.fields.get(self.field)?;
        let ok = value.chars().count() >= self.count
            && value.chars().take(self.count).all(|c| c.is_ascii_alphabetic());
        (!ok).then(|| format!("{} must start with {} letters", self.label, self.count))
    }
}

// =========================================================================
// Numbers
// =========================================================================
pub struct IntegerBetween {
    pub field: &'static str,
    pub label: &'static str,
    pub min: i64,
    pub max: i64,
}

impl ValidationRule for IntegerBetween {
    fn field(&self) -> &str {
        self.field
    }

    fn check(&self, input: &SubmissionInput) -> Option<String> {
        let value = input.fields.get(self.field)?;
        match value.parse::<i64>() {
            Ok(n) if (self.min..=self.max).contains(&n) => None,
            _ => Some(format!(
                "{} must be a whole number from {} to {}",
                self.label, self.min, self.max
            )),
        }
    }
}

// =========================================================================
// Shapes
// =========================================================================
pub struct IsoDate {
    pub field: &'static str,
    pub label: &'static str,
}

impl ValidationRule for IsoDate {
    fn field(&self) -> &str {
        self.field
    }

    fn check(&self, input: &SubmissionInput) -> Option<String> {
        let value = input.fields.get(self.field)?;
        parse_date(value)
            .is_none()
            .then(|| format!("{} must be a date in YYYY-MM-DD format", self.label))
    }
}

pub struct EmailShape {
    pub field: &'static str,
}

impl ValidationRule for EmailShape {
    fn field(&self) -> &str {
        self.field
    }

    fn check(&self, input: &SubmissionInput) -> Option<String> {
        let value = input.fields.get(self.field)?;
        (!EMAIL_PATTERN.is_match(value)).then(|| "Enter a valid email address".to_string())
    }
}

pub struct PhoneShape {
    pub field: &'static str,
}

impl ValidationRule for PhoneShape {
    fn field(&self) -> &str {
        self.field
    }

    fn check(&self, input: &SubmissionInput) -> Option<String> {
        let value = input.fields.get(self.field)?;
        (!PHONE_PATTERN.is_match(value)).then(|| "Enter a valid phone number".to_string())
    }
}

pub struct UuidShape {
    pub field: &'static str,
    pub label: &'static str,
}

impl ValidationRule for UuidShape {
    fn field(&self) -> &str {
        self.field
    }

    fn check(&self, input: &SubmissionInput) -> Option<String> {
        let value = input.fields.get(self.field)?;
        Uuid::parse_str(value)
            .is_err()
            .then(|| format!("{} is not a valid identifier", self.label))
    }
}

// =========================================================================
// Attachment
// =========================================================================
pub const ATTACHMENT_FIELD: &str = "attachment";

pub struct AttachmentSize {
    pub max_bytes: usize,
}

impl ValidationRule for AttachmentSize {
    fn field(&self) -> &str {
        ATTACHMENT_FIELD
    }

    fn check(&self, input: &SubmissionInput) -> Option<String> {
        let upload = input.attachment()?;
        (upload.len() > self.max_bytes).then(|| {
            format!(
                "Attachment must be at most {} MB",
                self.max_bytes.div_ceil(1024 * 1024)
            )
        })
    }
}
