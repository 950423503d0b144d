use async_trait::async_trait;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::Result;
use crate::records::{Condition, Filter, NewRecord, Row, Table};
use crate::store::RecordStore;

/// Postgres-backed record store. Ids and timestamps come from column defaults.
#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// `SELECT` for `table` with one `column = $n` test per condition, so the
/// planner can use the primary key and column indexes.
fn select_query(table: Table, filter: &Filter) -> Result<QueryBuilder<'static, Postgres>> {
    // Table and column names come from closed lists, never from input.
    let mut query = QueryBuilder::new("SELECT to_jsonb(t) FROM ");
    query.push(table.as_str()).push(" t");

    for (i, condition) in filter.resolve(table)?.into_iter().enumerate() {
        query
            .push(if i == 0 { " WHERE t." } else { " AND t." })
            .push(condition.column())
            .push(" = ");
        match condition {
            Condition::Uuid(_, id) => query.push_bind(id),
            Condition::Text(_, text) => query.push_bind(text),
        };
    }

    query.push(" ORDER BY t.created_at DESC");
    if let Some(limit) = filter.max_rows() {
        query.push(" LIMIT ").push_bind(limit);
    }
    Ok(query)
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn insert(&self, record: &NewRecord) -> Result<Uuid> {
        let id = match record {
            NewRecord::Department(d) => {
                sqlx::query_scalar::<_, Uuid>(
                    "INSERT INTO departments (name, description) VALUES ($1, $2) RETURNING id",
                )
                .bind(&d.name)
                .bind(&d.description)
                .fetch_one(&self.pool)
                .await?
            }
            NewRecord::Complaint(c) => {
                sqlx::query_scalar::<_, Uuid>(
                    r#"
                    INSERT INTO complaints
                    (complaint_type, description, location, incident_date, full_name, phone, email, department_id)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                    RETURNING id
                    "#,
                )
                .bind(&c.complaint_type)
                .bind(&c.description)
                .bind(&c.location)
                .bind(c.incident_date)
                .bind(&c.full_name)
                .bind(&c.phone)
                .bind(&c.email)
                .bind(c.department_id)
                .fetch_one(&self.pool)
                .await?
            }
            NewRecord::AnonymousComplaint(a) => {
                sqlx::query_scalar::<_, Uuid>(
                    r#"
                    INSERT INTO anonymous_complaints
                    (reference_number, category, details, location, incident_date, verification_code_hash, department_id)
                    VALUES ($1, $2, $3, $4, $5, $6, $7)
                    RETURNING id
                    "#,
                )
                .bind(a.reference_number.as_str())
                .bind(&a.category)
                .bind(&a.details)
                .bind(&a.location)
                .bind(a.incident_date)
                .bind(a.verification_code_hash.as_str())
                .bind(a.department_id)
                .fetch_one(&self.pool)
                .await?
            }
            NewRecord::Feedback(f) => {
                sqlx::query_scalar::<_, Uuid>(
                    r#"
                    INSERT INTO feedback
                    (service, rating, details, full_name, email, phone, department_id)
                    VALUES ($1, $2, $3, $4, $5, $6, $7)
                    RETURNING id
                    "#,
                )
                .bind(&f.service)
                .bind(i16::from(f.rating)) // u8 -> SMALLINT
                .bind(&f.details)
                .bind(&f.full_name)
                .bind(&f.email)
                .bind(&f.phone)
                .bind(f.department_id)
                .fetch_one(&self.pool)
                .await?
            }
            NewRecord::Attachment(a) => {
                sqlx::query_scalar::<_, Uuid>(
                    r#"
                    INSERT INTO attachments
                    (complaint_id, anonymous_complaint_id, feedback_id, file_name, file_path, file_type, file_size)
                    VALUES ($1, $2, $3, $4, $5, $6, $7)
                    RETURNING id
                    "#,
                )
                .bind(a.complaint_id())
                .bind(a.anonymous_complaint_id())
                .bind(a.feedback_id())
                .bind(&a.file_name)
                .bind(&a.file_path)
                .bind(&a.file_type)
                .bind(a.file_size)
                .fetch_one(&self.pool)
                .await?
            }
        };

        Ok(id)
    }

    async fn query(&self, table: Table, filter: &Filter) -> Result<Vec<Row>> {
        let mut query = select_query(table, filter)?;
        let rows: Vec<Json<Value>> = query
            .build_query_scalar()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|Json(row)| row).collect())
    }
}
