//! # ERP Server
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Server Lifecycle                               │
//! │                                                                         │
//! │  load config ──► open erp.db ──► open warehouse.db   (retry, backoff)   │
//! │                                          │                              │
//! │                                          ▼                              │
//! │                     spawn EtlWorker ──► serve HTTP (8000)               │
//! │                                          │                              │
//! │  SIGINT / SIGTERM ──► drain HTTP ──► stop worker ──► close pools        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use erp_db::{DbConfig, Schema};
use erp_etl::{EtlWorker, Pipeline, StatusBoard};
use erp_server::db::connect_with_retry;
use erp_server::{router, AppState, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .with_target(true)
        .init();

    info!("Starting ERP server...");

    let config = ServerConfig::load().context("loading configuration")?;
    info!(
        bind = %config.server.bind_address(),
        erp = %config.database.erp_path.display(),
        warehouse = %config.database.warehouse_path.display(),
        etl_interval_secs = config.etl.interval_secs,
        etl_enabled = config.etl.enabled,
        "Configuration loaded"
    );

    let startup_timeout = Duration::from_secs(config.database.startup_timeout_secs);
    let erp = connect_with_retry(DbConfig::new(&config.database.erp_path), startup_timeout)
        .await
        .context("opening ERP store")?;
    let warehouse = connect_with_retry(
        DbConfig::new(&config.database.warehouse_path).schema(Schema::Warehouse),
        startup_timeout,
    )
    .await
    .context("opening warehouse store")?;

    let pipeline = Pipeline::new(erp.clone(), warehouse.clone(), config.etl.store(), StatusBoard::new());
    let (worker, etl) = EtlWorker::new(pipeline, &config.etl);
    let worker_task = worker.spawn();

    let state = Arc::new(AppState::new(erp.clone(), warehouse.clone(), etl.clone()));
    let app = router(state);

    let listener = TcpListener::bind(config.server.bind_address())
        .await
        .with_context(|| format!("binding {}", config.server.bind_address()))?;
    info!(addr = %config.server.bind_address(), "HTTP server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server")?;

    etl.shutdown().await;
    if let Err(e) = worker_task.await {
        warn!(error = %e, "ETL worker ended abnormally");
    }

    erp.close().await;
    warehouse.close().await;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
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

    info!("Shutdown signal received, starting graceful shutdown...");
}
