mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use wfpulse_ingest::Collector;
use wfpulse_store::SnapshotStore;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = wfpulse_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let store = Arc::new(SnapshotStore::new(config.data_file.clone()));
    let collector = Arc::new(Collector::from_config(&config)?);

    // Bootstrap: populate an empty snapshot in the background instead of
    // blocking startup on three external services.
    if store.load_all().is_empty() {
        let collector = Arc::clone(&collector);
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            tracing::info!("empty snapshot at startup; running initial refresh");
            scheduler::run_refresh(&collector, &store).await;
        });
    }

    let mut refresh_scheduler = scheduler::build_scheduler(
        &config.cron_schedule,
        Arc::clone(&collector),
        Arc::clone(&store),
    )
    .await?;

    let app = build_app(AppState { store, collector });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "wfpulse-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Cancels future firings only; an in-flight refresh runs to completion.
    refresh_scheduler.shutdown().await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
