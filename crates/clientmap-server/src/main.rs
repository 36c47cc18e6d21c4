//! ClientMap server binary
//!
//! Usage:
//! ```bash
//! # With config file
//! clientmap-server --config clientmap.yaml
//!
//! # Environment overrides win over the file
//! CLIENTMAP_GEOCODER=photon clientmap-server --config clientmap.yaml
//!
//! # One-off lookup without starting the server
//! clientmap-server geocode "Springfield"
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use clientmap_geocode::{GeocodeProvider, Geocoder};
use clientmap_observability::init_logging;
use clientmap_server::{AppState, ServerConfig, build_router};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// ClientMap - client relationship map dashboard server
#[derive(Parser)]
#[command(name = "clientmap-server")]
#[command(about = "ClientMap dashboard API server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to configuration file (YAML or TOML)
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "CLIENTMAP_CONFIG",
        global = true
    )]
    config: Option<String>,

    /// Geocoding provider (nominatim or photon)
    #[arg(short, long, value_name = "PROVIDER", global = true)]
    geocoder: Option<GeocodeProvider>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server (default if no command specified)
    Serve,
    /// Look up a place and print the suggestions
    Geocode {
        /// Free-text place query
        query: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path))?,
        None => ServerConfig::default(),
    };

    // Environment overrides the file, the CLI overrides both
    config.merge_env();
    if let Some(provider) = cli.geocoder {
        config.geocoder.provider = provider;
    }

    init_logging(&config.logging.level, config.logging.json)?;
    match &cli.config {
        Some(path) => info!("Loaded configuration from {}", path),
        None => info!("Using default configuration"),
    }

    match cli.command {
        Some(Commands::Geocode { query }) => geocode(&config, &query).await,
        Some(Commands::Serve) | None => serve(config).await,
    }
}

async fn geocode(config: &ServerConfig, query: &str) -> anyhow::Result<()> {
    let geocoder = Geocoder::new(config.geocoder_config())?;
    let suggestions = geocoder.search(query).await?;
    if suggestions.is_empty() {
        println!("No results found");
    }
    for suggestion in suggestions {
        match &suggestion.kind {
            Some(kind) => println!("{} ({}) [{}]", suggestion.label, suggestion.coordinate, kind),
            None => println!("{} ({})", suggestion.label, suggestion.coordinate),
        }
    }
    Ok(())
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(&config)?;
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", config.host, config.port))?;
    let listener = TcpListener::bind(addr).await?;

    info!("ClientMap listening on http://{}", addr);
    info!("   Geocoder: {}", config.geocoder.provider);
    info!("   Health check:       http://{}/healthz", addr);
    info!("   Readiness check:    http://{}/readyz", addr);
    info!("   Prometheus metrics: http://{}/metrics", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Wait for shutdown signal (SIGINT or SIGTERM)
async fn shutdown_signal() {
    use tokio::signal;

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

    info!("Shutdown signal received");
}
