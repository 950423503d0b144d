use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;

use super::AttachmentStore;
use crate::error::StorageError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Bytes,
    pub content_type: String,
}

/// Keeps attachments in process memory. Used by demo mode and tests.
#[derive(Debug, Default)]
pub struct MemoryAttachmentStore {
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl MemoryAttachmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, path: &str) -> Option<StoredObject> {
        self.objects.read().await.get(path).cloned()
    }

    pub async fn paths(&self) -> Vec<String> {
        self.objects.read().await.keys().cloned().collect()
    }
}

#[async_trait]
impl AttachmentStore for MemoryAttachmentStore {
    async fn store(&self, path: &str, bytes: Bytes, content_type: &str) -> Result<(), StorageError> {
        self.objects.write().await.insert(
            path.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("memory://{path}")
    }
}
