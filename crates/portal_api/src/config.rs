use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use dotenvy::dotenv;
use portal_core::validation::schema::DEFAULT_MAX_UPLOAD_BYTES;
use portal_service::DEFAULT_REFERENCE_ATTEMPTS;

/// Where the production collaborators live. Absent in demo mode.
#[derive(Clone, Debug)]
pub struct Backends {
    pub database_url: String,
    pub s3_endpoint: String,
    pub s3_bucket: String,
    pub s3_region: String,
    pub auth_url: String,
    pub auth_api_key: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub site_url: String,
    /// `None` means demo mode: in-memory collaborators, nothing leaves the process.
    pub backends: Option<Backends>,
    pub demo_staff_token: Option<String>,
    pub backend_timeout: Option<Duration>,
    pub max_upload_bytes: usize,
    pub reference_attempts: u32,
    pub enable_cors: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok(); // Load .env if present
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, so tests need not touch
    /// the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        let demo_mode: bool = parse_or(&var, "PORTAL_DEMO_MODE", false)?;
        let backends = if demo_mode {
            None
        } else {
            Some(Backends {
                database_url: var("DATABASE_URL")
                    .context("DATABASE_URL must be set (or set PORTAL_DEMO_MODE=true)")?,
                s3_endpoint: or("S3_ENDPOINT", "http://localhost:9000"),
                s3_bucket: or("S3_BUCKET", "portal-attachments"),
                s3_region: or("AWS_REGION", "us-east-1"),
                auth_url: var("PORTAL_AUTH_URL")
                    .context("PORTAL_AUTH_URL must be set (or set PORTAL_DEMO_MODE=true)")?,
                auth_api_key: var("PORTAL_AUTH_API_KEY")
                    .context("PORTAL_AUTH_API_KEY must be set (or set PORTAL_DEMO_MODE=true)")?,
            })
        };

        let backend_timeout = match var("PORTAL_BACKEND_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw
                    .parse()
                    .with_context(|| format!("PORTAL_BACKEND_TIMEOUT_SECS is not a number: {raw}"))?;
                if secs == 0 {
                    return Err(anyhow!("PORTAL_BACKEND_TIMEOUT_SECS must be greater than zero"));
                }
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        let reference_attempts: u32 =
            parse_or(&var, "PORTAL_REFERENCE_ATTEMPTS", DEFAULT_REFERENCE_ATTEMPTS)?;
        if reference_attempts == 0 {
            return Err(anyhow!("PORTAL_REFERENCE_ATTEMPTS must be at least 1"));
        }

        Ok(Config {
            bind_addr: parse_or(&var, "PORTAL_BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000)))?,
            site_url: or("PORTAL_SITE_URL", "http://localhost:3000")
                .trim_end_matches('/')
                .to_string(),
            backends,
            demo_staff_token: var("PORTAL_DEMO_STAFF_TOKEN"),
            backend_timeout,
            max_upload_bytes: parse_or(&var, "PORTAL_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            reference_attempts,
            enable_cors: parse_or(&var, "PORTAL_ENABLE_CORS", false)?,
        })
    }

    pub fn demo_mode(&self) -> bool {
        self.backends.is_none()
    }
}

fn parse_or<T>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(key) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw}")),
        None => Ok(default),
    }
}
