//! Staff session gate in front of `/dashboard`.
//!
//! Sessions are owned by the hosted auth provider. This module only asks
//! "is there a signed-in user on this request?" and redirects accordingly.

use std::time::Duration;

use async_trait::async_trait;
use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, COOKIE},
        HeaderMap, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::{debug, warn};

use crate::state::AppState;

pub const DASHBOARD_PREFIX: &str = "/dashboard";
pub const LOGIN_PATH: &str = "/dashboard/login";
pub const HOME_PATH: &str = "/dashboard";
pub const ACCESS_TOKEN_COOKIE: &str = "portal-access-token";

/// The signed-in staff member, as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(rename = "id")]
    pub user_id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Auth provider unreachable: {0}")]
    Unreachable(String),

    #[error("Auth provider answered {0}")]
    Rejected(StatusCode),

    #[error("Auth provider sent an unreadable user: {0}")]
    Decode(String),
}

#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn current_session(&self, headers: &HeaderMap) -> Result<Option<Session>, SessionError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Pass,
    Redirect(&'static str),
}

/// `/dashboard` and everything below it, but not `/dashboards`.
pub fn is_protected(path: &str) -> bool {
    path == DASHBOARD_PREFIX
        || path
            .strip_prefix(DASHBOARD_PREFIX)
            .is_some_and(|rest| rest.starts_with('/'))
}

pub fn decide(path: &str, has_session: bool) -> GateDecision {
    if !is_protected(path) {
        return GateDecision::Pass;
    }
    match (path == LOGIN_PATH, has_session) {
        (false, false) => GateDecision::Redirect(LOGIN_PATH),
        (true, true) => GateDecision::Redirect(HOME_PATH),
        _ => GateDecision::Pass,
    }
}

pub async fn session_gate(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    if !is_protected(&path) {
        return next.run(req).await;
    }

    let session = match state.sessions.current_session(req.headers()).await {
        Ok(session) => session,
        Err(e) => {
            warn!(error = %e, %path, "session check failed; treating request as signed out");
            None
        }
    };

    match decide(&path, session.is_some()) {
        GateDecision::Redirect(to) => {
            debug!(%path, %to, "session gate redirect");
            Redirect::temporary(to).into_response()
        }
        GateDecision::Pass => {
            if let Some(session) = session {
                req.extensions_mut().insert(session);
            }
            next.run(req).await
        }
    }
}

/// Access token from the session cookie, falling back to a bearer header.
pub fn access_token(headers: &HeaderMap) -> Option<&str> {
    let from_cookie = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == ACCESS_TOKEN_COOKIE)
        .map(|(_, value)| value);

    from_cookie
        .or_else(|| {
            headers
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
        })
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Validates access tokens against the hosted auth API.
#[derive(Clone)]
pub struct RemoteSessionProvider {
    client: reqwest::Client,
    user_endpoint: String,
    api_key: String,
}

impl RemoteSessionProvider {
    pub fn new(
        auth_url: &str,
        api_key: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, SessionError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| SessionError::Unreachable(e.to_string()))?;

        Ok(Self {
            client,
            user_endpoint: format!("{}/auth/v1/user", auth_url.trim_end_matches('/')),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl SessionProvider for RemoteSessionProvider {
    async fn current_session(&self, headers: &HeaderMap) -> Result<Option<Session>, SessionError> {
        let Some(token) = access_token(headers) else {
            return Ok(None);
        };

        let response = self
            .client
            .get(&self.user_endpoint)
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| SessionError::Unreachable(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(SessionError::Rejected(status));
        }

        let session = response
            .json::<Session>()
            .await
            .map_err(|e| SessionError::Decode(e.to_string()))?;
        Ok(Some(session))
    }
}

/// Accepts exactly one fixed token. Backs demo mode; with no token configured
/// nobody is ever signed in.
#[derive(Debug, Clone, Default)]
pub struct StaticSessionProvider {
    token: Option<String>,
}

impl StaticSessionProvider {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }
}

#[async_trait]
impl SessionProvider for StaticSessionProvider {
    async fn current_session(&self, headers: &HeaderMap) -> Result<Option<Session>, SessionError> {
        let signed_in = match (&self.token, access_token(headers)) {
            (Some(expected), Some(presented)) => tokens_match(expected, presented),
            _ => false,
        };
        Ok(signed_in.then(|| Session {
            user_id: "demo-staff".to_string(),
            email: None,
        }))
    }
}

/// Token equality that does not short-circuit on the first differing byte.
fn tokens_match(expected: &str, presented: &str) -> bool {
    expected.as_bytes().ct_eq(presented.as_bytes()).into()
}
