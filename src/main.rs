// pixelgate - AI media generation gateway and local gallery
// Author: kelexine (https://github.com/kelexine)

use anyhow::Result;
use clap::Parser;
use pixelgate::cli::{commands, Args, Command};
use pixelgate::config::AppConfig;
use pixelgate::server::create_router;
use pixelgate::upstream::UpstreamClient;
use pixelgate::utils::logging;
use std::net::SocketAddr;
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Phase 1: Load configuration
    let mut config = AppConfig::load()?;
    args.apply(&mut config);

    // Phase 2: Initialize logging (client commands keep stdout for their output)
    let is_server = matches!(args.command, None | Some(Command::Serve));
    if !is_server {
        config.logging.level = "warn".to_string();
    }
    logging::init(&config.logging)?;

    match args.command {
        None | Some(Command::Serve) => serve(config).await,
        Some(command) => commands::run(command, &config).await,
    }
}

async fn serve(config: AppConfig) -> Result<()> {
    info!("Starting pixelgate v{}", env!("CARGO_PKG_VERSION"));

    // Phase 3: Build the upstream client
    let upstream = UpstreamClient::new(&config.upstream)?;
    info!("Processing service: {}", upstream.base_url());
    info!("Frontend origin: {}", config.server.frontend_url);

    // Phase 4: Build and start HTTP server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let app = create_router(config, upstream)?;

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Phase 5: Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
