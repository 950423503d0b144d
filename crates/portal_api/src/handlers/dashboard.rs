use axum::{
    extract::{Query, State},
    Extension, Json,
};
use portal_db::{Row, Table};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiResult;
use crate::session::{Session, LOGIN_PATH};
use crate::state::AppState;

const DEFAULT_PAGE: i64 = 50;
const MAX_PAGE: i64 = 200;

#[derive(Debug, Default, Deserialize)]
pub struct Page {
    pub limit: Option<i64>,
}

impl Page {
    fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE).clamp(1, MAX_PAGE)
    }
}

pub async fn home(Extension(session): Extension<Session>) -> Json<Value> {
    Json(json!({
        "signedInAs": session.email.as_deref().unwrap_or(&session.user_id),
        "sections": [
            { "name": "complaints", "path": "/dashboard/complaints" },
            { "name": "anonymous-complaints", "path": "/dashboard/anonymous-complaints" },
            { "name": "feedback", "path": "/dashboard/feedback" },
            { "name": "attachments", "path": "/dashboard/attachments" },
        ],
    }))
}

/// The gate only lets signed-out visitors reach this page.
pub async fn login() -> Json<Value> {
    Json(json!({
        "message": "Sign in with your staff account to open the dashboard.",
        "path": LOGIN_PATH,
    }))
}

pub async fn complaints(
    State(state): State<AppState>,
    Query(page): Query<Page>,
) -> ApiResult<Json<Vec<Row>>> {
    list(&state, Table::Complaints, &page).await
}

pub async fn anonymous_complaints(
    State(state): State<AppState>,
    Query(page): Query<Page>,
) -> ApiResult<Json<Vec<Row>>> {
    list(&state, Table::AnonymousComplaints, &page).await
}

pub async fn feedback(
    State(state): State<AppState>,
    Query(page): Query<Page>,
) -> ApiResult<Json<Vec<Row>>> {
    list(&state, Table::Feedback, &page).await
}

pub async fn attachments(
    State(state): State<AppState>,
    Query(page): Query<Page>,
) -> ApiResult<Json<Vec<Row>>> {
    list(&state, Table::Attachments, &page).await
}

async fn list(state: &AppState, table: Table, page: &Page) -> ApiResult<Json<Vec<Row>>> {
    let rows = state.intake.recent(table, page.limit()).await?;
    Ok(Json(rows))
}
