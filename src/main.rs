use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use tracing_subscriber::EnvFilter;

use form_builder::config::Config;
use form_builder::db;
use form_builder::media::CloudinaryUploader;
use form_builder::store::PgSubmissionStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env if present
    if dotenvy::dotenv().is_err() {
        eprintln!("No .env file found");
    }

    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(&config.log_level)
        }))
        .init();

    tracing::info!("Starting form builder");

    let pool = db::connect(&config).await?;

    let uploader = CloudinaryUploader::new(config.cloudinary.clone(), config.upload.clone());
    if uploader.is_configured() {
        tracing::info!(folder = %config.upload.folder, "Cloudinary configured");
    } else {
        tracing::warn!("Cloudinary credentials not set; uploads will be skipped");
    }

    let store = PgSubmissionStore::new(pool.clone(), config.store_timeout);

    let addr = SocketAddr::new(config.host, config.port);
    let app = form_builder::build_app(config, Arc::new(uploader), Arc::new(store));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("Disconnected from database");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
