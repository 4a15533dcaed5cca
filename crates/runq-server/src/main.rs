use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use runq_core::AppBuilder;
use runq_core::impls::SqliteResultStore;
use runq_server::config::ServerConfig;
use runq_server::router::build_router;
use runq_server::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "runq_server=info,runq_core=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::parse();
    tracing::info!(listen = %config.listen, db = %config.db.display(), "Loaded server configuration");

    // --- Result store ---
    let store = Arc::new(
        SqliteResultStore::open(&config.db, config.open_timeout())
            .await
            .with_context(|| format!("could not open result store {}", config.db.display()))?,
    );
    tracing::info!("Result store opened");

    // --- App + worker ---
    let executor = config.executor();
    tracing::info!(program = executor.program(), "Job command configured");
    let app = AppBuilder::new()
        .config(config.runner_config())
        .store(store.clone())
        .executor(Arc::new(executor))
        .build()
        .context("invalid runner configuration")?;
    let (service, worker) = app.start();

    // --- HTTP ---
    let router = build_router(
        AppState::new(service),
        &config.static_dir,
        config.request_timeout(),
    );
    let listener = tokio::net::TcpListener::bind(config.listen)
        .await
        .with_context(|| format!("could not listen on {}", config.listen))?;
    tracing::info!(addr = %config.listen, "Listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, waiting for the running job");
    worker.shutdown_and_join().await;
    store.close().await;
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
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
    tracing::info!("Shutdown signal received");
}
