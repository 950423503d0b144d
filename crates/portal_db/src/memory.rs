use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::records::{Filter, NewRecord, Row, Table};
use crate::store::RecordStore;

/// Process-local record store. Backs demo mode and the test suites; nothing
/// survives a restart.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    tables: RwLock<HashMap<Table, Vec<Row>>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self, table: Table) -> usize {
        self.tables.read().await.get(&table).map_or(0, Vec::len)
    }

    pub async fn is_empty(&self, table: Table) -> bool {
        self.len(table).await == 0
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert(&self, record: &NewRecord) -> Result<Uuid> {
        let table = record.table();
        let mut columns = record.to_columns()?;

        let id = Uuid::new_v4();
        let created_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .map_err(|e| StoreError::Database(e.to_string()))?;
        columns.insert("id".into(), Value::String(id.to_string()));
        columns.insert("created_at".into(), Value::String(created_at));
        if table.has_status() {
            columns.insert("status".into(), Value::String("pending".into()));
        }

        self.tables
            .write()
            .await
            .entry(table)
            .or_default()
            .push(Value::Object(columns));
        Ok(id)
    }

    async fn query(&self, table: Table, filter: &Filter) -> Result<Vec<Row>> {
        // Same column rules as Postgres, so tests catch unindexed lookups.
        filter.resolve(table)?;

        let tables = self.tables.read().await;
        let limit = filter
            .max_rows()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(usize::MAX);
        let rows = tables
            .get(&table)
            .map(|rows| {
                rows.iter()
                    .rev()
                    .filter(|row| filter.matches(row))
                    .take(limit)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_core::models::Feedback;
    use serde_json::json;

    fn feedback(service: &str) -> NewRecord {
        NewRecord::Feedback(Feedback {
            service: service.into(),
            rating: 4,
            details: "Fast and friendly".into(),
            full_name: None,
            email: None,
            phone: None,
            department_id: None,
        })
    }

    #[tokio::test]
    async fn inserted_rows_are_queryable_by_id() {
        let store = MemoryRecordStore::new();
        let id = store.insert(&feedback("water")).await.unwrap();

        let rows = store
            .query(Table::Feedback, &Filter::new().eq("id", id.to_string()))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["service"], json!("water"));
        assert_eq!(rows[0]["rating"], json!(4));
        assert!(rows[0].get("status").is_none());
    }

    #[tokio::test]
    async fn query_is_newest_first_and_limited() {
        let store = MemoryRecordStore::new();
        for service in ["a", "b", "c"] {
            store.insert(&feedback(service)).await.unwrap();
        }
        let rows = store
            .query(Table::Feedback, &Filter::new().limit(2))
            .await
            .unwrap();
        let services: Vec<_> = rows.iter().map(|r| r["service"].clone()).collect();
        assert_eq!(services, vec![json!("c"), json!("b")]);
        assert!(store.is_empty(Table::Complaints).await);
    }

    #[tokio::test]
    async fn unlisted_filter_columns_are_rejected() {
        let store = MemoryRecordStore::new();
        store.insert(&feedback("water")).await.unwrap();

        let result = store
            .query(Table::Feedback, &Filter::new().eq("service", "water"))
            .await;
        assert!(matches!(result, Err(StoreError::Database(_))));
    }
}
