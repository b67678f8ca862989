use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use hyper::server::conn::http1;
use hyper_util::rt::{TokioIo, TokioTimer};
use hyper_util::server::graceful::GracefulShutdown;
use hyper_util::service::TowerToHyperService;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tracing_subscriber::EnvFilter;

// Error tracing
use anyhow::{Context, Result};
use tracing::{error, info, warn};

use restsrv::tower_middle::TimeoutLayer;
use restsrv::{AppState, Router};
use shared::config::{load_config, validate_config};
use shared::types::server_config::AppConfig;

/// REST API server for posts with signed-and-encrypted session tokens.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// TOML configuration file; built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<String>,

    /// Address to listen on, e.g. 127.0.0.1:8443. Overrides the config file.
    #[arg(short = 'p', long)]
    addr: Option<String>,

    /// Root directory for static files. Overrides the config file.
    #[arg(short, long)]
    webroot: Option<String>,
}

fn resolve_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path).with_context(|| format!("Failed to load {}", path))?,
        None => AppConfig::default(),
    };

    if let Some(addr) = &args.addr {
        let addr: SocketAddr = addr
            .parse()
            .with_context(|| format!("Invalid listen address: {}", addr))?;
        config.server.bind = addr.ip().to_string();
        config.server.port = addr.port();
    }

    if let Some(webroot) = &args.webroot {
        config.paths.web_dir = webroot.clone();
    }

    validate_config(&config).context("Invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = resolve_config(&args)?;

    let addr = config.server.addr();
    let request_timeout = Duration::from_secs(config.server.request_timeout_secs);
    let shutdown_grace = Duration::from_secs(config.server.shutdown_grace_secs);

    // Keys must exist before the first connection is accepted.
    let state = AppState::new(config).await.inspect_err(|e| {
        error!("Cannot start without token keys: {:#}", e);
    })?;

    let service = ServiceBuilder::new()
        .layer(TimeoutLayer::new(request_timeout))
        .service(Router::new(state));

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}. CTRL+C to stop.", addr);

    let graceful = GracefulShutdown::new();
    let mut ctrl_c = std::pin::pin!(tokio::signal::ctrl_c());

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!("Failed to accept connection: {}", e);
                        continue;
                    }
                };

                let io = TokioIo::new(stream);
                let conn = http1::Builder::new()
                    .timer(TokioTimer::new())
                    .serve_connection(io, TowerToHyperService::new(service.clone()));
                let conn = graceful.watch(conn);

                tokio::task::spawn(async move {
                    if let Err(err) = conn.await {
                        warn!("Error serving connection from {}: {:?}", peer, err);
                    }
                });
            }

            _ = &mut ctrl_c => {
                info!("Shutdown signal received, closing listener");
                break;
            }
        }
    }

    drop(listener);

    tokio::select! {
        _ = graceful.shutdown() => {
            info!("All connections closed, shutdown complete");
        }
        _ = tokio::time::sleep(shutdown_grace) => {
            warn!("Timed out after {:?} waiting for connections to close", shutdown_grace);
        }
    }

    Ok(())
}
