pub mod error;
pub mod memory;
pub mod records;
pub mod repository;
pub mod schema;
pub mod store;

// Re-export common types for convenience
pub use error::StoreError;
pub use memory::MemoryRecordStore;
pub use records::{ColumnKind, Condition, Filter, NewRecord, Row, Table};
pub use repository::PgRecordStore;
pub use store::RecordStore;
