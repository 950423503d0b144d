pub mod error;
pub mod intake;
pub mod lookup;
pub mod storage;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use portal_db::{MemoryRecordStore, RecordStore};

pub use error::{IntakeError, StorageError};
pub use intake::{AttachmentOutcome, IntakeReceipt};
pub use lookup::AnonymousStatus;
pub use storage::{AttachmentStore, MemoryAttachmentStore};

pub const DEFAULT_REFERENCE_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntakeOptions {
    /// Upper bound for each individual backend call. `None` waits forever.
    pub backend_timeout: Option<Duration>,
    /// How many reference numbers to draw before accepting a duplicate.
    pub reference_attempts: u32,
}

impl Default for IntakeOptions {
    fn default() -> Self {
        Self {
            backend_timeout: None,
            reference_attempts: DEFAULT_REFERENCE_ATTEMPTS,
        }
    }
}

/// Writes citizen submissions to the record store and their attachments to
/// object storage. Cheap to clone; construct once per process.
#[derive(Clone)]
pub struct IntakeService {
    records: Arc<dyn RecordStore>,
    attachments: Arc<dyn AttachmentStore>,
    options: IntakeOptions,
}

impl IntakeService {
    pub fn new(
        records: Arc<dyn RecordStore>,
        attachments: Arc<dyn AttachmentStore>,
        options: IntakeOptions,
    ) -> Self {
        Self {
            records,
            attachments,
            options,
        }
    }

    /// Offline variant: every write lands in process memory.
    pub fn in_memory(options: IntakeOptions) -> Self {
        Self::new(
            Arc::new(MemoryRecordStore::new()),
            Arc::new(MemoryAttachmentStore::new()),
            options,
        )
    }

    pub fn records(&self) -> &Arc<dyn RecordStore> {
        &self.records
    }

    async fn within<T, E, F>(&self, call: F, on_timeout: impl FnOnce(Duration) -> E) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
    {
        match self.options.backend_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .unwrap_or_else(|_| Err(on_timeout(limit))),
            None => call.await,
        }
    }
}
