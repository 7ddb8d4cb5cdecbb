//! Vaultbox Server, a personal cloud drive
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt};

use vaultbox_api::{AppState, build_router};
use vaultbox_core::config::{AppConfig, DatabaseProvider};
use vaultbox_database::{DatabasePool, Stores};
use vaultbox_storage::build_object_store;
use vaultbox_worker::jobs::{CleanupJobHandler, LinkSweepHandler, OrphanReconcileHandler};
use vaultbox_worker::{CronScheduler, JobExecutor};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e:#}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e:#}");
        std::process::exit(1);
    }
}

/// Load configuration from the config directory and environment
fn load_configuration() -> anyhow::Result<AppConfig> {
    let dir = std::env::var("VAULTBOX_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
    let env = std::env::var("VAULTBOX_ENV").unwrap_or_else(|_| "development".to_string());

    AppConfig::load(&dir, &env)
        .with_context(|| format!("loading config from '{dir}' (env: {env})"))
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> anyhow::Result<()> {
    tracing::info!("Starting Vaultbox v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Structured stores ────────────────────────────────
    let (stores, db_pool) = match config.database.provider {
        DatabaseProvider::Postgres => {
            tracing::info!("Connecting to database...");
            let pool = DatabasePool::open(&config.database)
                .await
                .context("database connection failed")?;
            (Stores::postgres(pool.pool().clone()), Some(pool))
        }
        DatabaseProvider::Memory => {
            tracing::warn!("Using in-memory stores; data is lost on restart");
            (Stores::memory(), None)
        }
    };

    // ── Step 2: Object store ─────────────────────────────────────
    tracing::info!(provider = ?config.storage.provider, "Initializing object store...");
    let objects = build_object_store(&config.storage)
        .await
        .context("object store init failed")?;

    // ── Step 3: Background maintenance ───────────────────────────
    let mut scheduler = if config.worker.enabled {
        tracing::info!("Starting maintenance scheduler...");

        let links = vaultbox_service::LinkService::new(
            Arc::clone(&stores.files),
            Arc::clone(&stores.links),
            vaultbox_auth::AccessResolver::new(
                Arc::clone(&stores.files),
                Arc::clone(&stores.user_shares),
                Arc::clone(&stores.links),
            ),
            vaultbox_service::ActivityLogger::new(Arc::clone(&stores.activities)),
            &config.share,
        )?;
        let cleanup = Arc::new(CleanupJobHandler::new(
            links,
            Arc::clone(&stores.files),
            Arc::clone(&stores.links),
            Arc::clone(&stores.user_shares),
            Arc::clone(&objects),
            config.worker.reconcile_batch_size,
        ));

        let mut executor = JobExecutor::new();
        executor.register(Arc::new(LinkSweepHandler::new(Arc::clone(&cleanup))));
        executor.register(Arc::new(OrphanReconcileHandler::new(cleanup)));

        let scheduler = CronScheduler::new(Arc::new(executor)).await?;
        scheduler.register_default_tasks(&config.worker).await?;
        scheduler.start().await?;
        Some(scheduler)
    } else {
        tracing::info!("Maintenance scheduler disabled");
        None
    };

    // ── Step 4: Build and start HTTP server ──────────────────────
    let addr = config.server.bind_address();
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let app_state = AppState::new(config, stores, objects)?;
    let app = build_router(app_state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("Vaultbox server listening on {}", addr);

    // ── Step 5: Graceful shutdown ────────────────────────────────
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Shutdown signal received, stopping background tasks...");
    if let Some(scheduler) = scheduler.as_mut() {
        match tokio::time::timeout(grace, scheduler.shutdown()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "Scheduler shutdown failed"),
            Err(_) => tracing::warn!("Scheduler did not stop within the grace period"),
        }
    }
    if let Some(pool) = db_pool {
        pool.close().await;
    }

    tracing::info!("Vaultbox server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
}
