use concierge_core::Result;
use concierge_server::{ServerConfig, StartupError, build_router, startup};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server failed to start");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), StartupError> {
    load_env_file();

    let config = ServerConfig::from_env()?;
    tracing::info!("Loaded configuration");

    let provider = startup::openai_provider(&config)?;
    let gateway = startup::build_gateway(&config, provider).await?;
    let app = build_router(Arc::new(gateway));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .map_err(|e| StartupError::Bind {
            addr: config.bind_addr.to_string(),
            reason: e.to_string(),
        })?;

    tracing::info!("listening on http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| StartupError::Serve {
            reason: e.to_string(),
        })?;
    Ok(())
}

/// Loads `ENV_FILE` (default `.env`) into the process environment.
///
/// Variables already set in the environment win.
fn load_env_file() {
    let path = std::env::var_os("ENV_FILE")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(".env"));
    match dotenvy::from_path(&path) {
        Ok(()) => tracing::info!(path = %path.display(), "Loaded environment file"),
        Err(e) if e.not_found() => {
            tracing::debug!(path = %path.display(), "No environment file")
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to load environment file")
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
