use std::fmt;

use serde_json::{Map, Value};

use portal_core::models::{
    AnonymousComplaintRecord, AttachmentRecord, Complaint, Department, Feedback,
};
use uuid::Uuid;

use crate::error::{Result, StoreError};

/// A row as returned by [`crate::RecordStore::query`]: a JSON object keyed by
/// column name.
pub type Row = Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Departments,
    Complaints,
    AnonymousComplaints,
    Feedback,
    Attachments,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Departments => "departments",
            Table::Complaints => "complaints",
            Table::AnonymousComplaints => "anonymous_complaints",
            Table::Feedback => "feedback",
            Table::Attachments => "attachments",
        }
    }

    /// Tables whose rows carry a workflow `status` column.
    pub fn has_status(&self) -> bool {
        matches!(self, Table::Complaints | Table::AnonymousComplaints)
    }

    /// Columns a [`Filter`] may test on this table. Each one is the primary
    /// key, a foreign key or carries an index.
    pub fn filter_columns(&self) -> &'static [(&'static str, ColumnKind)] {
        use ColumnKind::{Text, Uuid};
        match self {
            Table::Departments => &[("id", Uuid), ("name", Text)],
            Table::Complaints => &[("id", Uuid), ("department_id", Uuid), ("status", Text)],
            Table::AnonymousComplaints => &[
                ("id", Uuid),
                ("department_id", Uuid),
                ("reference_number", Text),
                ("verification_code_hash", Text),
                ("status", Text),
            ],
            Table::Feedback => &[("id", Uuid), ("department_id", Uuid)],
            Table::Attachments => &[
                ("id", Uuid),
                ("complaint_id", Uuid),
                ("anonymous_complaint_id", Uuid),
                ("feedback_id", Uuid),
            ],
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Uuid,
    Text,
}

/// A filter condition checked against the table's column list and typed for
/// binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Uuid(&'static str, Uuid),
    Text(&'static str, String),
}

impl Condition {
    pub fn column(&self) -> &'static str {
        match self {
            Condition::Uuid(column, _) | Condition::Text(column, _) => *column,
        }
    }
}

/// One row to insert. The store generates its `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewRecord {
    Department(Department),
    Complaint(Complaint),
    AnonymousComplaint(AnonymousComplaintRecord),
    Feedback(Feedback),
    Attachment(AttachmentRecord),
}

impl NewRecord {
    pub fn table(&self) -> Table {
        match self {
            NewRecord::Department(_) => Table::Departments,
            NewRecord::Complaint(_) => Table::Complaints,
            NewRecord::AnonymousComplaint(_) => Table::AnonymousComplaints,
            NewRecord::Feedback(_) => Table::Feedback,
            NewRecord::Attachment(_) => Table::Attachments,
        }
    }

    /// The department a submission is routed to, if any.
    pub fn department_id(&self) -> Option<Uuid> {
        match self {
            NewRecord::Complaint(c) => c.department_id,
            NewRecord::AnonymousComplaint(a) => a.department_id,
            NewRecord::Feedback(f) => f.department_id,
            NewRecord::Department(_) | NewRecord::Attachment(_) => None,
        }
    }

    /// Column values of the record, without store-generated columns.
    pub fn to_columns(&self) -> Result<Map<String, Value>> {
        let value = match self {
            NewRecord::Department(d) => serde_json::to_value(d),
            NewRecord::Complaint(c) => serde_json::to_value(c),
            NewRecord::AnonymousComplaint(a) => serde_json::to_value(a),
            NewRecord::Feedback(f) => serde_json::to_value(f),
            NewRecord::Attachment(a) => serde_json::to_value(a),
        }
        .map_err(|e| StoreError::Database(format!("cannot encode {} row: {e}", self.table())))?;

        let Value::Object(mut columns) = value else {
            return Err(StoreError::Database(format!(
                "{} row did not encode as an object",
                self.table()
            )));
        };
        if let NewRecord::Attachment(a) = self {
            columns.insert(a.owner.column().to_string(), Value::String(a.owner.id().to_string()));
        }
        Ok(columns)
    }
}

/// Equality conditions on columns, all of which must hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Map<String, Value>,
    limit: Option<i64>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.insert(column.into(), value.into());
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn max_rows(&self) -> Option<i64> {
        self.limit
    }

    /// Checks every condition against the columns `table` allows and types
    /// its value. Unknown columns and mistyped values are errors.
    pub fn resolve(&self, table: Table) -> Result<Vec<Condition>> {
        self.conditions
            .iter()
            .map(|(column, value)| {
                let (name, kind) = table
                    .filter_columns()
                    .iter()
                    .find(|(name, _)| *name == column.as_str())
                    .copied()
                    .ok_or_else(|| {
                        StoreError::Database(format!("cannot filter {table} on column '{column}'"))
                    })?;
                let text = value.as_str().ok_or_else(|| {
                    StoreError::Database(format!("filter value for {table}.{name} must be a string"))
                })?;
                match kind {
                    ColumnKind::Text => Ok(Condition::Text(name, text.to_owned())),
                    ColumnKind::Uuid => Uuid::parse_str(text)
                        .map(|id| Condition::Uuid(name, id))
                        .map_err(|_| {
                            StoreError::Database(format!("{table}.{name} filter is not a UUID: {text}"))
                        }),
                }
            })
            .collect()
    }

    pub fn matches(&self, row: &Row) -> bool {
        self.conditions
            .iter()
            .all(|(column, expected)| row.get(column) == Some(expected))
    }
}
