use std::time::Duration;

use portal_db::StoreError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Bucket unavailable: {0}")]
    Bucket(String),

    #[error("Attachment storage timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Error, Debug)]
pub enum IntakeError {
    /// The submission itself could not be recorded. Nothing was written.
    #[error("Primary write failed: {0}")]
    PrimaryWrite(#[source] StoreError),

    /// The submission names a department that does not exist. Nothing was
    /// written.
    #[error("Unknown department: {0}")]
    UnknownDepartment(Uuid),

    #[error("Record query failed: {0}")]
    Query(#[source] StoreError),
}

pub type Result<T> = std::result::Result<T, IntakeError>;
