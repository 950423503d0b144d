use std::sync::Arc;

use anyhow::{Context, Result};
use portal_core::Limits;
use portal_db::PgRecordStore;
use portal_service::storage::{S3AttachmentStore, S3Settings};
use portal_service::{IntakeOptions, IntakeService};
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use crate::config::Config;
use crate::session::{RemoteSessionProvider, SessionProvider, StaticSessionProvider};

/// Collaborators shared by every request. Built once in `main`.
#[derive(Clone)]
pub struct AppState {
    pub intake: IntakeService,
    pub sessions: Arc<dyn SessionProvider>,
    pub limits: Limits,
    pub site_url: Arc<str>,
}

impl AppState {
    pub fn new(
        intake: IntakeService,
        sessions: Arc<dyn SessionProvider>,
        limits: Limits,
        site_url: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            intake,
            sessions,
            limits,
            site_url: site_url.into(),
        }
    }

    /// Connects the production collaborators, or the in-memory ones in demo mode.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let options = IntakeOptions {
            backend_timeout: config.backend_timeout,
            reference_attempts: config.reference_attempts,
        };
        let limits = Limits {
            max_upload_bytes: config.max_upload_bytes,
        };

        let Some(backends) = &config.backends else {
            warn!("PORTAL_DEMO_MODE is on: submissions are kept in memory and lost on restart");
            return Ok(Self::new(
                IntakeService::in_memory(options),
                Arc::new(StaticSessionProvider::new(config.demo_staff_token.clone())),
                limits,
                config.site_url.as_str(),
            ));
        };

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&backends.database_url)
            .await
            .context("Failed to connect to the database")?;
        info!("Connected to database");

        let attachments = S3AttachmentStore::connect(&S3Settings {
            endpoint: backends.s3_endpoint.clone(),
            bucket: backends.s3_bucket.clone(),
            region: backends.s3_region.clone(),
        })
        .await;
        if let Err(e) = attachments.ensure_bucket().await {
            // Intake still works without it; uploads will report failure.
            warn!(error = %e, bucket = %backends.s3_bucket, "attachment bucket is not available");
        }

        let sessions = RemoteSessionProvider::new(
            &backends.auth_url,
            backends.auth_api_key.clone(),
            config.backend_timeout,
        )
        .context("Failed to build the auth client")?;

        Ok(Self::new(
            IntakeService::new(Arc::new(PgRecordStore::new(pool)), Arc::new(attachments), options),
            Arc::new(sessions),
            limits,
            config.site_url.as_str(),
        ))
    }
}
