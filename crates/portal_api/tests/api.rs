//! HTTP-level tests against the in-memory collaborators.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{
    header::{AUTHORIZATION, COOKIE, LOCATION},
    HeaderMap, HeaderValue, StatusCode,
};
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use portal_api::session::{Session, SessionError, SessionProvider, StaticSessionProvider};
use portal_api::{app_router, AppState};
use portal_core::models::Department;
use portal_core::Limits;
use portal_db::{Filter, NewRecord, Table};
use portal_service::{IntakeOptions, IntakeService};
use serde_json::{json, Value};

const STAFF_TOKEN: &str = "staff-secret";

/// Counts how often the gate asks about the session.
struct CountingSessions {
    inner: StaticSessionProvider,
    calls: AtomicUsize,
}

#[async_trait]
impl SessionProvider for CountingSessions {
    async fn current_session(&self, headers: &HeaderMap) -> Result<Option<Session>, SessionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.current_session(headers).await
    }
}

struct BrokenSessions;

#[async_trait]
impl SessionProvider for BrokenSessions {
    async fn current_session(&self, _: &HeaderMap) -> Result<Option<Session>, SessionError> {
        Err(SessionError::Unreachable("connection refused".into()))
    }
}

fn test_server_with(sessions: Arc<dyn SessionProvider>, limits: Limits) -> (TestServer, IntakeService) {
    let intake = IntakeService::in_memory(IntakeOptions::default());
    let state = AppState::new(intake.clone(), sessions, limits, "https://portal.example.org");
    (TestServer::new(app_router(state)).unwrap(), intake)
}

fn test_server() -> (TestServer, IntakeService, Arc<CountingSessions>) {
    let sessions = Arc::new(CountingSessions {
        inner: StaticSessionProvider::new(Some(STAFF_TOKEN.into())),
        calls: AtomicUsize::new(0),
    });
    let (server, intake) = test_server_with(sessions.clone(), Limits::default());
    (server, intake, sessions)
}

fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
}

// ============ Health & Sitemap ============

#[tokio::test]
async fn test_health_check() {
    let (server, _, _) = test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({"status": "ok"}));
}

#[tokio::test]
async fn test_sitemap_is_xml() {
    let (server, _, _) = test_server();

    let response = server.get("/sitemap.xml").await;

    response.assert_status_ok();
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/xml"
    );
    assert!(response
        .text()
        .contains("<loc>https://portal.example.org/feedback</loc>"));
}

// ============ Intake ============

#[tokio::test]
async fn test_feedback_urlencoded_creates_one_row() {
    let (server, intake, _) = test_server();

    let response = server
        .post("/feedback")
        .form(&[
            ("feedback_service", "water"),
            ("rating", "5"),
            ("feedback_details", "Great service"),
        ])
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], json!(true));
    assert!(body.get("errors").is_none());
    assert!(body.get("referenceNumber").is_none());
    let id = body["id"].as_str().unwrap().to_string();

    let rows = intake
        .records()
        .query(Table::Feedback, &Filter::new().eq("id", id))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["rating"], json!(5));
    let attachments = intake
        .records()
        .query(Table::Attachments, &Filter::new())
        .await
        .unwrap();
    assert!(attachments.is_empty());
}

#[tokio::test]
async fn test_validation_lists_every_failing_field() {
    let (server, intake, _) = test_server();

    let response = server
        .post("/complaints")
        .form(&[("description", "too short"), ("email", "not-an-email")])
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], json!(false));
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    for expected in ["complaint_type", "description", "full_name", "phone", "email"] {
        assert!(fields.contains(&expected), "missing error for {expected}: {fields:?}");
    }
    assert_eq!(fields.len(), 5);

    let rows = intake
        .records()
        .query(Table::Complaints, &Filter::new())
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_complaint_multipart_with_attachment() {
    let (server, intake, _) = test_server();

    let form = MultipartForm::new()
        .add_text("complaint_type", "roads")
        .add_text("description", "Streetlight has been out for two weeks")
        .add_text("full_name", "Amina Yusuf")
        .add_text("phone", "+255 700 000 000")
        .add_text("incident_date", "2024-03-01")
        .add_part(
            "attachment",
            Part::bytes(vec![0x89, 0x50, 0x4e, 0x47])
                .file_name("C:\\photos\\Lamp.PNG")
                .mime_type("image/png"),
        );

    let response = server.post("/complaints").multipart(form).await;

    response.assert_status_ok();
    let body: Value = response.json();
    let id = body["id"].as_str().unwrap();
    assert!(!body["message"].as_str().unwrap().contains("attachment"));

    let attachments = intake
        .records()
        .query(Table::Attachments, &Filter::new().eq("complaint_id", id))
        .await
        .unwrap();
    assert_eq!(attachments.len(), 1);
    assert_eq!(attachments[0]["file_name"], json!("Lamp.PNG"));
    assert_eq!(attachments[0]["file_type"], json!("image/png"));
    let path = attachments[0]["file_path"].as_str().unwrap();
    assert!(path.starts_with(&format!("complaints/{id}/{id}-")));
    assert!(path.ends_with(".png"));
}

#[tokio::test]
async fn test_unknown_department_is_a_field_error() {
    let (server, intake, _) = test_server();

    let response = server
        .post("/feedback")
        .form(&[
            ("feedback_service", "water"),
            ("rating", "3"),
            ("feedback_details", "Meter reading was late"),
            ("department_id", "6f1c2a52-3f5e-4d3b-9a57-2d7f0c9b1e44"),
        ])
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["errors"][0]["field"], json!("department_id"));

    let rows = intake
        .records()
        .query(Table::Feedback, &Filter::new())
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_known_department_is_accepted() {
    let (server, intake, _) = test_server();
    let department = intake
        .records()
        .insert(&NewRecord::Department(Department {
            name: "Water & Sanitation".into(),
            description: None,
        }))
        .await
        .unwrap();

    let response = server
        .post("/feedback")
        .form(&[
            ("feedback_service", "water"),
            ("rating", "4"),
            ("feedback_details", "Leak fixed within a day"),
            ("department_id", department.to_string().as_str()),
        ])
        .await;

    response.assert_status_ok();
    let rows = intake
        .records()
        .query(Table::Feedback, &Filter::new().eq("department_id", department.to_string()))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn test_oversized_attachment_is_a_field_error() {
    let sessions = Arc::new(StaticSessionProvider::new(None));
    let (server, _) = test_server_with(sessions, Limits { max_upload_bytes: 8 });

    let form = MultipartForm::new()
        .add_text("feedback_service", "water")
        .add_text("rating", "4")
        .add_text("feedback_details", "Pressure is low in the mornings")
        .add_part(
            "attachment",
            Part::bytes(vec![0u8; 64]).file_name("big.bin").mime_type("application/octet-stream"),
        );

    let response = server.post("/feedback").multipart(form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["errors"][0]["field"], json!("attachment"));
}

#[tokio::test]
async fn test_unreadable_body_is_a_bad_request() {
    let (server, _, _) = test_server();

    let response = server
        .post("/feedback")
        .json(&json!({"feedback_service": "water"}))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["success"], json!(false));
}

// ============ Anonymous flow ============

#[tokio::test]
async fn test_anonymous_submission_and_status_lookup() {
    let (server, intake, _) = test_server();

    let response = server
        .post("/complaints/anonymous")
        .form(&[
            ("category", "corruption"),
            ("details", "Permit office asked for an unofficial fee"),
            ("location", "Ward 4 office"),
            ("verification_code", "mz2024"),
        ])
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let reference = body["referenceNumber"].as_str().unwrap().to_string();
    assert!(reference.starts_with("ANO-") && reference.ends_with("-MZ"));
    assert!(body.get("id").is_none());

    let stored = intake
        .records()
        .query(Table::AnonymousComplaints, &Filter::new())
        .await
        .unwrap();
    assert!(!stored[0].to_string().contains("mz2024"));

    let found = server
        .post("/complaints/anonymous/status")
        .form(&[
            ("reference_number", reference.to_lowercase().as_str()),
            ("verification_code", "mz2024"),
        ])
        .await;
    found.assert_status_ok();
    let status: Value = found.json();
    assert_eq!(status["success"], json!(true));
    assert_eq!(status["referenceNumber"], json!(reference));
    assert_eq!(status["status"], json!("pending"));
    assert!(status["submittedAt"].is_string());

    let wrong = server
        .post("/complaints/anonymous/status")
        .form(&[
            ("reference_number", reference.as_str()),
            ("verification_code", "wrong1"),
        ])
        .await;
    wrong.assert_status(StatusCode::NOT_FOUND);

    let unknown = server
        .post("/complaints/anonymous/status")
        .form(&[
            ("reference_number", "ANO-1111-ZZ"),
            ("verification_code", "mz2024"),
        ])
        .await;
    unknown.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(
        wrong.json::<Value>()["message"],
        unknown.json::<Value>()["message"]
    );
}

#[tokio::test]
async fn test_digit_first_code_is_rejected() {
    let (server, _, _) = test_server();

    let response = server
        .post("/complaints/anonymous")
        .form(&[
            ("category", "noise"),
            ("details", "Generator runs all night behind the market"),
            ("location", "Central market"),
            ("verification_code", "12ab"),
        ])
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["errors"][0]["field"],
        json!("verification_code")
    );
}

// ============ Session gate ============

#[tokio::test]
async fn test_dashboard_redirects_to_login_without_session() {
    let (server, _, _) = test_server();

    let response = server.get("/dashboard/complaints").await;

    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers().get(LOCATION).unwrap(), "/dashboard/login");
}

#[tokio::test]
async fn test_unknown_dashboard_page_is_still_gated() {
    let (server, _, _) = test_server();

    let signed_out = server.get("/dashboard/reports").await;
    signed_out.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(signed_out.headers().get(LOCATION).unwrap(), "/dashboard/login");

    let signed_in = server
        .get("/dashboard/reports")
        .add_header(AUTHORIZATION, bearer(STAFF_TOKEN))
        .await;
    signed_in.assert_status_not_found();
}

#[tokio::test]
async fn test_login_page_redirects_home_with_session() {
    let (server, _, _) = test_server();

    let signed_out = server.get("/dashboard/login").await;
    signed_out.assert_status_ok();

    let signed_in = server
        .get("/dashboard/login")
        .add_header(
            COOKIE,
            HeaderValue::from_str(&format!("portal-access-token={STAFF_TOKEN}")).unwrap(),
        )
        .await;
    signed_in.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(signed_in.headers().get(LOCATION).unwrap(), "/dashboard");
}

#[tokio::test]
async fn test_signed_in_staff_see_listings_without_digests() {
    let (server, intake, _) = test_server();
    server
        .post("/complaints/anonymous")
        .form(&[
            ("category", "roads"),
            ("details", "Bridge railing is broken near the river"),
            ("location", "River road"),
            ("verification_code", "rr99"),
        ])
        .await
        .assert_status_ok();

    let home = server
        .get("/dashboard")
        .add_header(AUTHORIZATION, bearer(STAFF_TOKEN))
        .await;
    home.assert_status_ok();
    assert_eq!(home.json::<Value>()["signedInAs"], json!("demo-staff"));

    let listing = server
        .get("/dashboard/anonymous-complaints")
        .add_header(AUTHORIZATION, bearer(STAFF_TOKEN))
        .await;
    listing.assert_status_ok();
    let rows: Vec<Value> = listing.json();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].get("verification_code_hash").is_none());
    assert_eq!(rows[0]["category"], json!("roads"));

    // The digest is still stored, just never listed.
    let stored = intake
        .records()
        .query(Table::AnonymousComplaints, &Filter::new())
        .await
        .unwrap();
    assert!(stored[0]["verification_code_hash"].is_string());
}

#[tokio::test]
async fn test_attachment_listing_links_to_storage() {
    let (server, _, _) = test_server();
    let form = MultipartForm::new()
        .add_text("feedback_service", "parks")
        .add_text("rating", "2")
        .add_text("feedback_details", "Broken swing in the playground")
        .add_part(
            "attachment",
            Part::bytes(vec![0xff, 0xd8, 0xff]).file_name("swing.jpg").mime_type("image/jpeg"),
        );
    server.post("/feedback").multipart(form).await.assert_status_ok();

    let listing = server
        .get("/dashboard/attachments")
        .add_header(AUTHORIZATION, bearer(STAFF_TOKEN))
        .await;

    listing.assert_status_ok();
    let rows: Vec<Value> = listing.json();
    assert_eq!(rows.len(), 1);
    let path = rows[0]["file_path"].as_str().unwrap();
    assert_eq!(rows[0]["file_url"], json!(format!("memory://{path}")));
}

#[tokio::test]
async fn test_public_paths_never_consult_sessions() {
    let (server, _, sessions) = test_server();

    server.get("/health").await.assert_status_ok();
    server.get("/sitemap.xml").await.assert_status_ok();
    server.get("/dashboards").await.assert_status_not_found();
    server
        .post("/feedback")
        .form(&[("rating", "3")])
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(sessions.calls.load(Ordering::SeqCst), 0);

    server
        .get("/dashboard")
        .await
        .assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(sessions.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_session_provider_failure_means_signed_out() {
    let (server, _) = test_server_with(Arc::new(BrokenSessions), Limits::default());

    let response = server
        .get("/dashboard/feedback")
        .add_header(AUTHORIZATION, bearer(STAFF_TOKEN))
        .await;

    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers().get(LOCATION).unwrap(), "/dashboard/login");
}
