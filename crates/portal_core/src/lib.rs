pub mod identifiers;
pub mod models;
pub mod validation;

use uuid::Uuid;

use models::SubmissionKind;

pub use identifiers::{CodeDigest, ReferenceNumber, VerificationCode};
pub use validation::schema::Limits;
pub use validation::{FieldError, ValidationErrors};

/// Object-storage key for an attachment:
/// `<kind dir>/<owner id>/<owner id>-<unix millis>[.<ext>]`.
///
/// The owner id plus the upload time keep two files for the same submission
/// apart; the original extension is kept so downloads open in the right app.
pub fn attachment_path(
    kind: SubmissionKind,
    owner_id: Uuid,
    extension: Option<&str>,
    unix_millis: i128,
) -> String {
    let base = format!("{}/{owner_id}/{owner_id}-{unix_millis}", kind.storage_dir());
    match extension {
        Some(ext) if !ext.is_empty() => format!("{base}.{ext}"),
        _ => base,
    }
}
