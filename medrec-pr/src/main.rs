//! medrec-pr (Patient Registry) - CRUD HTTP service over patient records
//!
//! Records live in a JSON file (default) or a SQLite table. The store is
//! created empty on first start.

use anyhow::{Context, Result};
use clap::Parser;
use medrec_common::config::{StorageBackend, TomlConfig};
use medrec_common::store::open_store;
use medrec_common::PatientService;
use medrec_pr::{build_router, AppState};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for medrec-pr
#[derive(Parser, Debug)]
#[command(name = "medrec-pr")]
#[command(about = "Patient registry service for medrec")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "MEDREC_PR_PORT")]
    port: Option<u16>,

    /// TOML config file (default: <config_dir>/medrec/config.toml)
    #[arg(short, long, env = "MEDREC_CONFIG")]
    config: Option<PathBuf>,

    /// Storage backend: json or sqlite
    #[arg(short, long, env = "MEDREC_BACKEND")]
    backend: Option<StorageBackend>,

    /// Patient JSON file (json backend)
    #[arg(long)]
    data_file: Option<PathBuf>,

    /// SQLite database file (sqlite backend)
    #[arg(long)]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = TomlConfig::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "medrec_pr={level},medrec_common={level},tower_http=info",
                    level = config.logging.level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting medrec Patient Registry (medrec-pr) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &args.config {
        Some(path) => info!("Config file: {}", path.display()),
        None => info!("Config file: default location"),
    }

    let backend = args.backend.unwrap_or(config.storage.backend);
    let path = match backend {
        StorageBackend::Json => config.storage.resolve_data_file(args.data_file.as_deref()),
        StorageBackend::Sqlite => config
            .storage
            .resolve_database_path(args.database.as_deref()),
    };

    let store = match open_store(backend, &path).await {
        Ok(store) => {
            info!("✓ Opened {} store at {}", backend, store.location());
            store
        }
        Err(e) => {
            error!("Failed to open {} store at {}: {}", backend, path.display(), e);
            return Err(e.into());
        }
    };

    let state = AppState::new(Arc::new(PatientService::new(store)));
    let app = build_router(state);

    let port = args.port.unwrap_or(config.server.pr_port);
    let addr = format!("{}:{}", config.server.host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("medrec-pr listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
