use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use portal_core::models::{FormFields, SubmissionInput, SubmissionKind};
use portal_core::validation::schema::validator_for;
use portal_core::{FieldError, Limits};

#[derive(Debug, Args)]
pub struct ValidateArgs {
    /// Submission kind: complaint, anonymous or feedback
    #[arg(short, long)]
    pub kind: SubmissionKind,

    /// JSON file holding one flat object of form fields
    #[arg(short, long)]
    pub file: PathBuf,
}

/// Runs the same validator the HTTP intake uses. Returns the failing fields.
pub fn check(kind: SubmissionKind, json: &str) -> Result<Vec<FieldError>> {
    let value: serde_json::Value =
        serde_json::from_str(json).context("File is not valid JSON")?;
    let fields = FormFields::from_json(&value).context("Expected a JSON object of form fields")?;
    let input = SubmissionInput::new(fields, None);
    Ok(validator_for(kind, Limits::default()).run(&input))
}

pub fn execute(args: ValidateArgs) -> Result<bool> {
    println!("🔍 Validating {} form: {:?}", args.kind, args.file);

    let content = fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let errors = check(args.kind, &content)?;

    if errors.is_empty() {
        println!("🎉 VALIDATION PASSED!");
        return Ok(true);
    }

    println!("⚠️  VALIDATION FAILED: {} field(s).", errors.len());
    println!("{:-<50}", "-");
    for err in errors {
        println!("🛑 {}: {}", err.field, err.message);
    }
    Ok(false)
}
