use portal_core::{ReferenceNumber, VerificationCode};
use portal_db::{Filter, Row, StoreError, Table};
use serde::Serialize;
use serde_json::Value;

use crate::error::{IntakeError, Result};
use crate::IntakeService;

/// What an anonymous submitter may learn about their own complaint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnonymousStatus {
    pub reference_number: String,
    pub status: String,
    pub category: Option<String>,
    pub submitted_at: Option<String>,
}

impl AnonymousStatus {
    fn from_row(row: &Row) -> Self {
        let text = |column: &str| row.get(column).and_then(Value::as_str).map(str::to_owned);
        Self {
            reference_number: text("reference_number").unwrap_or_default(),
            status: text("status").unwrap_or_else(|| "pending".to_string()),
            category: text("category"),
            submitted_at: text("created_at"),
        }
    }
}

impl IntakeService {
    /// Finds an anonymous complaint by reference number and verification code.
    /// Both must match; a wrong code looks exactly like an unknown reference.
    pub async fn lookup_anonymous(
        &self,
        reference: &ReferenceNumber,
        code: &VerificationCode,
    ) -> Result<Option<AnonymousStatus>> {
        let filter = Filter::new()
            .eq("reference_number", reference.as_str())
            .eq("verification_code_hash", code.digest().as_str())
            .limit(1);

        let rows = self
            .within(
                self.records.query(Table::AnonymousComplaints, &filter),
                StoreError::Timeout,
            )
            .await
            .map_err(IntakeError::Query)?;

        Ok(rows.first().map(AnonymousStatus::from_row))
    }

    /// Newest rows of `table` for the staff dashboard. Credential digests are
    /// stripped before anything leaves the service, and attachment rows gain a
    /// `file_url` staff can open.
    pub async fn recent(&self, table: Table, limit: i64) -> Result<Vec<Row>> {
        let mut rows = self
            .within(
                self.records.query(table, &Filter::new().limit(limit)),
                StoreError::Timeout,
            )
            .await
            .map_err(IntakeError::Query)?;

        for row in &mut rows {
            if let Some(columns) = row.as_object_mut() {
                columns.remove("verification_code_hash");
                if table == Table::Attachments {
                    let url = columns
                        .get("file_path")
                        .and_then(Value::as_str)
                        .map(|path| self.attachments.public_url(path));
                    if let Some(url) = url {
                        columns.insert("file_url".into(), Value::String(url));
                    }
                }
            }
        }
        Ok(rows)
    }
}
