use std::any::Any;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::error::ApiError;
use crate::handlers::{dashboard, health_check, intake, status};
use crate::session::session_gate;
use crate::sitemap::sitemap;
use crate::state::AppState;

/// Room for the text fields on top of the largest allowed attachment, so an
/// oversized file still reaches validation and gets a field-level error.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

pub fn app_router(state: AppState) -> Router {
    let body_limit = state.limits.max_upload_bytes.saturating_add(FORM_OVERHEAD_BYTES);

    let dashboard = Router::new()
        .route("/dashboard", get(dashboard::home))
        .route("/dashboard/login", get(dashboard::login))
        .route("/dashboard/complaints", get(dashboard::complaints))
        .route("/dashboard/anonymous-complaints", get(dashboard::anonymous_complaints))
        .route("/dashboard/feedback", get(dashboard::feedback))
        .route("/dashboard/attachments", get(dashboard::attachments));

    let router = Router::new()
        .route("/health", get(health_check))
        .route("/sitemap.xml", get(sitemap))
        .route("/complaints", post(intake::submit_complaint))
        .route("/complaints/anonymous", post(intake::submit_anonymous))
        .route("/complaints/anonymous/status", post(status::lookup_anonymous))
        .route("/feedback", post(intake::submit_feedback))
        .merge(dashboard)
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), session_gate))
        .layer(DefaultBodyLimit::max(body_limit));

    with_error_boundary(router).with_state(state)
}

/// Request tracing, and a panicking handler answers with the generic JSON 500
/// instead of dropping the connection.
pub fn with_error_boundary<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Not found".to_string())
}

fn handle_panic(_: Box<dyn Any + Send + 'static>) -> Response {
    ApiError::Internal("request handler panicked".to_string()).into_response()
}
