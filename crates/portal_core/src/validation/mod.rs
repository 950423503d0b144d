use serde::Serialize;
use thiserror::Error;

use crate::models::SubmissionInput;

pub mod rules;
pub mod schema;

/// One failing field and why.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Every field that failed, in the order the rules were registered.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{} field(s) failed validation", .errors.len())]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(vec![FieldError::new(field, message)])
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.iter().map(|e| e.field.as_str())
    }
}

// The contract every rule must fulfill
pub trait ValidationRule: Send + Sync {
    /// The form field this rule reports against.
    fn field(&self) -> &str;

    /// `Some(message)` when the input breaks the rule.
    fn check(&self, input: &SubmissionInput) -> Option<String>;
}

/// Holds the rules of one form and runs all of them.
///
/// A field reports at most once: after its first failing rule, later rules
/// for the same field are skipped so "required" does not also produce a
/// "too short" message.
#[derive(Default)]
pub struct ValidationEngine {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl ValidationEngine {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn add_rule<R: ValidationRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn run(&self, input: &SubmissionInput) -> Vec<FieldError> {
        let mut errors: Vec<FieldError> = Vec::new();
        for rule in &self.rules {
            if errors.iter().any(|e| e.field == rule.field()) {
                continue;
            }
            if let Some(message) = rule.check(input) {
                errors.push(FieldError::new(rule.field(), message));
            }
        }
        errors
    }

    pub fn validate(&self, input: &SubmissionInput) -> Result<(), ValidationErrors> {
        let errors = self.run(input);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors::new(errors))
        }
    }
}
