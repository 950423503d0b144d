use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::records::{Filter, NewRecord, Row, Table};

/// The backing record store, as the intake pipeline sees it.
///
/// Implementations own their connection handling; callers only see whether
/// an insert produced an id and what rows a query returned.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Inserts one row and returns the id the store generated for it.
    async fn insert(&self, record: &NewRecord) -> Result<Uuid>;

    /// Rows of `table` matching `filter`, newest first.
    async fn query(&self, table: Table, filter: &Filter) -> Result<Vec<Row>>;
}
