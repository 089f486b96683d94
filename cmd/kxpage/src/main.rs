//! # kxpage
//!
//! Assembles the events timeline and image store from configuration and
//! serves them until interrupted.

use std::sync::Arc;

use anyhow::{Context, Result};
use api_adapters::{create_router, AppState};
use auth_adapters::AdminTokenGuard;
use configs::{LogFormat, Settings};
use secrecy::ExposeSecret;
use services::{EventService, ImageService};
use storage_adapters::{LocalImageStore, SqliteEventRepo};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,tower_http=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load().context("failed to load configuration")?;
    init_tracing(settings.log.format);
    tracing::info!("kxpage v{}", env!("CARGO_PKG_VERSION"));
    if let Some(path) = &settings.env_file {
        tracing::info!(path = %path.display(), "loaded .env file");
    }

    let repo = SqliteEventRepo::connect(settings.database.url.expose_secret(), settings.database.max_connections)
        .await
        .context("failed to open event database")?;
    let repo = Arc::new(repo);
    tracing::info!(max_connections = settings.database.max_connections, "event database ready");

    let images = LocalImageStore::open(settings.storage.image_dir.clone())
        .await
        .context("failed to open image directory")?;
    tracing::info!(dir = %settings.storage.image_dir.display(), "image store ready");

    let guard = AdminTokenGuard::from_secret(&settings.admin.secret);
    let state = AppState::new(
        EventService::new(repo.clone()),
        ImageService::new(Arc::new(images)),
        Arc::new(guard),
    );
    let app = create_router(state, settings.server.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(&settings.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", settings.server.bind))?;
    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    repo.close().await;
    tracing::info!("shutdown complete");
    Ok(())
}
