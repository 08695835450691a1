//! CourseHub Server: concurrent course enrollment service.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use coursehub_api::AppState;
use coursehub_cache::CoordinationManager;
use coursehub_core::config::AppConfig;
use coursehub_core::error::AppError;
use coursehub_core::traits::CoordinationStore;
use coursehub_database::{DatabasePool, EnrollmentStore, PgEnrollmentStore};
use coursehub_guard::{AdmissionLimiter, DistributedLock, LockOptions};
use coursehub_service::EnrollmentService;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load `config/default.toml`, the `COURSEHUB_ENV` overlay and
/// `COURSEHUB__*` environment variables.
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("COURSEHUB_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
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
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting CourseHub v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let db = DatabasePool::connect(&config.database).await?;

    coursehub_database::migration::run_migrations(db.pool()).await?;

    let store: Arc<dyn EnrollmentStore> = Arc::new(PgEnrollmentStore::new(db.clone()));

    // ── Step 2: Coordination store ───────────────────────────────
    tracing::info!(
        provider = %config.coordination.provider,
        "Initializing coordination store..."
    );
    let coordination: Arc<dyn CoordinationStore> =
        Arc::new(CoordinationManager::new(&config.coordination).await?);

    // ── Step 3: Shutdown channel ─────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Step 4: Admission limiter + refill task ──────────────────
    let limiter = Arc::new(AdmissionLimiter::new(&config.admission));
    let refill_handle = limiter.spawn_refill(shutdown_rx.clone());
    if refill_handle.is_none() {
        tracing::warn!("Admission refill disabled; the bucket will drain permanently");
    }

    // ── Step 5: Services ─────────────────────────────────────────
    let lock = DistributedLock::new(Arc::clone(&coordination), LockOptions::from(&config.lock));
    let enrollment = Arc::new(EnrollmentService::new(
        Arc::clone(&store),
        Arc::clone(&limiter),
        lock,
        config.enrollment.clone(),
    ));

    // ── Step 6: Build and start HTTP server ──────────────────────
    let addr = config.server.bind_address();
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);

    let app = coursehub_api::build_app(AppState {
        config: Arc::new(config),
        enrollment,
        store,
        coordination,
    });

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("CourseHub server listening on {}", addr);

    // ── Step 7: Graceful shutdown ────────────────────────────────
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        let _ = shutdown_tx.send(true);
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Step 8: Wait for background tasks ────────────────────────
    if let Some(handle) = refill_handle {
        let _ = tokio::time::timeout(grace, handle).await;
    }
    db.close().await;

    tracing::info!("CourseHub server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
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
