//! AgileWeb Server
//!
//! HTTP front end for the content access decision engine. Browser
//! extensions post page data to `/api/filter` and get back an
//! ALLOW / GATE / BLOCK decision.

use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{info, warn};

mod config;
mod routes;
mod state;

use config::ServerConfig;
use state::AppState;

#[derive(Parser, Debug)]
#[command(name = "agileweb-server")]
#[command(about = "AgileWeb content access decision server", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "agileweb.yaml")]
    config: String,

    /// Listen address, overrides the configuration file
    #[arg(short = 'l', long)]
    listen: Option<String>,

    /// Listen port, overrides the configuration file
    #[arg(short = 'P', long)]
    port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    info!("Starting AgileWeb server");

    let config = ServerConfig::load(&cli.config, &cli)?;
    info!(
        mode = ?config.engine.mode,
        audit_capacity = config.audit_capacity,
        "Configuration loaded"
    );

    let metrics_handle = init_metrics()?;

    let state = AppState::new(&config, metrics_handle)?;
    info!("Decision engine ready");

    let addr: SocketAddr = format!("{}:{}", config.listen, config.port).parse()?;
    let app = routes::create_router(state, config.max_body_bytes);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on SIGTERM or Ctrl+C
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
    warn!("Shutdown signal received, stopping server...");
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("agileweb=debug")
    } else {
        EnvFilter::try_from_env("AGILEWEB_LOG")
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("agileweb=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Install the Prometheus recorder and return the handle for `/metrics`
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    agileweb_telemetry::metrics::describe();

    info!("Metrics exporter initialized");
    Ok(handle)
}
