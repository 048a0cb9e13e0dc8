// src/main.rs
use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use service_prober::{
    config::{self, LogFormat},
    probe::{run_startup_probes, ServiceProber},
    server::{RequestHandler, ServerBuilder},
};

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();

    // Optional config file; environment variables still take precedence.
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = config::load_config(config_path.as_deref())
        .context("Failed to load configuration")?;

    init_tracing(config.log_format)?;

    info!("Starting service prober...");
    match dotenv {
        Ok(path) => info!("Successfully loaded {}", path.display()),
        Err(e) => warn!("Could not load .env file, using system environment variables: {}", e),
    }
    if let Some(path) = &config_path {
        info!("Loaded configuration file: {}", path.display());
    }
    config.log_loaded();

    // Probes run to completion before the listener binds.
    let prober = ServiceProber::new(config.probe_timeout)
        .context("Failed to create HTTP client")?;
    let summary = run_startup_probes(&config, &prober).await;
    if summary.failures() > 0 {
        warn!("{} upstream service(s) unreachable at startup", summary.failures());
    }

    info!("Service starting on {}", config.listen_addr());
    ServerBuilder::new(config.listen_addr())
        .with_handler(RequestHandler::new())
        .serve_with_shutdown(shutdown_signal())
        .await?;

    info!("Service stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new("service_prober=debug,hyper=info,reqwest=info")
    })?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
    Ok(())
}

// Graceful shutdown handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
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
                warn!("Failed to install SIGTERM handler: {}", e);
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

    info!("Shutdown signal received");
}
