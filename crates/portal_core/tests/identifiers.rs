use portal_core::models::{FormFields, SubmissionInput};
use portal_core::validation::schema::validate_anonymous;
use portal_core::{CodeDigest, Limits, ReferenceNumber, VerificationCode};
use proptest::prelude::*;
use regex::Regex;

fn anonymous_input(code: &str) -> SubmissionInput {
    let fields: FormFields = [
        ("category", "street lighting"),
        ("details", "The lamp on the corner has been dark for a month"),
        ("location", "5th and Pine"),
        ("verification_code", code),
    ]
    .into_iter()
    .collect();
    SubmissionInput::new(fields, None)
}

proptest! {
    #[test]
    fn reference_matches_shape_and_code_prefix(code in "[a-zA-Z]{2}[a-zA-Z0-9!#%]{2,8}") {
        let pattern = Regex::new(r"^ANO-\d{4}-[A-Z]{2}$").unwrap();
        let complaint = validate_anonymous(&anonymous_input(&code), Limits::default()).unwrap();
        let reference = ReferenceNumber::generate(&complaint.verification_code);

        prop_assert!(pattern.is_match(reference.as_str()), "{}", reference);
        let letters = &reference.as_str()[9..];
        prop_assert_eq!(letters, code[..2].to_uppercase());
    }

    #[test]
    fn digest_is_deterministic(code in "\\PC{4,10}") {
        prop_assert_eq!(CodeDigest::of(&code), CodeDigest::of(&code));
        prop_assert_eq!(VerificationCode::new(code.clone()).digest(), CodeDigest::of(&code));
    }

    #[test]
    fn distinct_codes_have_distinct_digests(a in "[a-z0-9]{4,10}", b in "[a-z0-9]{4,10}") {
        prop_assume!(a != b);
        prop_assert_ne!(CodeDigest::of(&a), CodeDigest::of(&b));
    }

    #[test]
    fn digest_never_contains_plaintext(code in "[g-z]{4,10}") {
        // Hex output only uses 0-9a-f, so a g-z code can never appear in it.
        let digest = CodeDigest::of(&code);
        prop_assert!(!digest.as_str().contains(&code));
        prop_assert_eq!(digest.as_str().len(), 64);
    }
}
