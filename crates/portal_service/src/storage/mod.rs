use async_trait::async_trait;
use bytes::Bytes;

use crate::error::StorageError;

pub mod memory;
pub mod s3;

pub use memory::MemoryAttachmentStore;
pub use s3::{S3AttachmentStore, S3Settings};

/// Where attachment bytes live.
#[async_trait]
pub trait AttachmentStore: Send + Sync {
    async fn store(&self, path: &str, bytes: Bytes, content_type: &str) -> Result<(), StorageError>;

    /// URL a staff member can open to retrieve the object at `path`.
    fn public_url(&self, path: &str) -> String;
}
