//! HTTP surface of the municipal portal: citizen intake endpoints, the
//! anonymous status lookup, the sitemap and the gated staff dashboard.

use std::time::Duration;

use anyhow::{Context, Result};
use axum::http::{header::CONTENT_TYPE, Method};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

pub mod config;
pub mod error;
pub mod form;
pub mod handlers;
pub mod routes;
pub mod session;
pub mod sitemap;
pub mod state;

pub use config::Config;
pub use routes::app_router;
pub use state::AppState;

pub async fn serve(config: Config) -> Result<()> {
    info!("Initializing state...");
    let state = AppState::from_config(&config).await?;

    let mut app = app_router(state);
    if config.enable_cors {
        app = app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([CONTENT_TYPE])
                .max_age(Duration::from_secs(60 * 60)),
        );
    }

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("Server running on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
