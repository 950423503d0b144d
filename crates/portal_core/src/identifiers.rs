//! Reference numbers and verification-code digests for anonymous complaints.
//!
//! A reference number looks like `ANO-4821-KX`: a random four digit number and
//! the first two letters of the submitter's verification code, uppercased.
//! Reference numbers are display identifiers only. They are not unique by
//! construction, so anything that needs proof of ownership goes through the
//! code digest instead.

use std::fmt;

use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use serde::Serialize;
use sha2::{Digest, Sha256};

pub const REFERENCE_PREFIX: &str = "ANO";

static REFERENCE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ANO-\d{4}-[A-Z]{2}$").expect("reference pattern is valid"));

/// The secret an anonymous submitter picks to prove ownership later.
///
/// Never serialized and redacted from `Debug`; only [`CodeDigest`] is stored.
#[derive(Clone, PartialEq, Eq)]
pub struct VerificationCode(String);

impl VerificationCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn digest(&self) -> CodeDigest {
        CodeDigest::of(&self.0)
    }

    fn prefix_letters(&self) -> String {
        self.0.chars().take(2).collect::<String>().to_uppercase()
    }
}

impl fmt::Debug for VerificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VerificationCode(***)")
    }
}

/// Lowercase hex SHA-256 of a verification code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CodeDigest(String);

impl CodeDigest {
    pub fn of(code: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(code.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ReferenceNumber(String);

impl ReferenceNumber {
    /// Draws a new reference number for `code` from the thread-local RNG.
    pub fn generate(code: &VerificationCode) -> Self {
        Self::generate_with(code, &mut rand::rng())
    }

    pub fn generate_with<R: Rng + ?Sized>(code: &VerificationCode, rng: &mut R) -> Self {
        let number: u16 = rng.random_range(1000..=9999);
        Self(format!("{REFERENCE_PREFIX}-{number}-{}", code.prefix_letters()))
    }

    /// Accepts a user-typed reference number, tolerating surrounding
    /// whitespace and lowercase letters.
    pub fn parse(input: &str) -> Option<Self> {
        let candidate = input.trim().to_ascii_uppercase();
        REFERENCE_PATTERN
            .is_match(&candidate)
            .then_some(Self(candidate))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReferenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
