//! medrec-ip (Insurance Premium) - Premium category prediction service
//!
//! The model is loaded once at startup. A missing or ill-formed model does not
//! stop the service: `/health` reports it and `/predict` answers 503.

use anyhow::{Context, Result};
use clap::Parser;
use medrec_common::config::TomlConfig;
use medrec_common::prediction::{LinearPremiumModel, PremiumClassifier};
use medrec_ip::{build_router, AppState};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for medrec-ip
#[derive(Parser, Debug)]
#[command(name = "medrec-ip")]
#[command(about = "Insurance premium prediction service for medrec")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "MEDREC_IP_PORT")]
    port: Option<u16>,

    /// TOML config file (default: <config_dir>/medrec/config.toml)
    #[arg(short, long, env = "MEDREC_CONFIG")]
    config: Option<PathBuf>,

    /// Premium model JSON file
    #[arg(short, long)]
    model: Option<PathBuf>,
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
                    "medrec_ip={level},medrec_common={level},tower_http=info",
                    level = config.logging.level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting medrec Insurance Premium (medrec-ip) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let model_path = config.model.resolve_path(args.model.as_deref());
    let model: Option<Arc<dyn PremiumClassifier>> = match LinearPremiumModel::load(&model_path) {
        Ok(model) => {
            info!(
                "✓ Loaded model {} v{} ({} classes) from {}",
                model.model_name,
                model.version,
                model.classes.len(),
                model_path.display()
            );
            Some(Arc::new(model))
        }
        Err(e) => {
            error!("Failed to load premium model: {}", e);
            warn!("Serving without a model; /predict will answer 503");
            None
        }
    };

    let app = build_router(AppState::new(model, config.literals.clone()));

    let port = args.port.unwrap_or(config.server.ip_port);
    let addr = format!("{}:{}", config.server.host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("medrec-ip listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

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
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received terminate signal, shutting down"),
    }
}
