//! FHIR Proxy
//!
//! A small reverse proxy built with Tokio and Axum that lets browser clients
//! reach a FHIR API.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────┐
//!                        │                 FHIR PROXY                   │
//!   Client Request       │  ┌─────────┐    ┌──────────────────────┐     │
//!   ─────────────────────┼─▶│  http   │───▶│ forward::token       │     │
//!                        │  │ server  │    │ forward::resource    │     │
//!                        │  └─────────┘    └──────────┬───────────┘     │
//!                        │                            ▼                 │
//!   Client Response      │  ┌─────────┐    ┌──────────────────────┐     │
//!   ◀────────────────────┼──│response │◀───│  upstream client     │◀────┼──── FHIR API
//!                        │  │ relay   │    └──────────────────────┘     │
//!                        │  └─────────┘                                 │
//!                        │  config · observability · lifecycle          │
//!                        └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use fhir_proxy::config::{self, ConfigError, ProxyConfig};
use fhir_proxy::observability::{logging, metrics};
use fhir_proxy::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "fhir-proxy")]
#[command(about = "CORS-friendly proxy for a FHIR API", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen port (overrides PORT).
    #[arg(short, long)]
    port: Option<u16>,

    /// Upstream base URL (overrides FHIR_BASE_URL).
    #[arg(short, long)]
    upstream: Option<String>,
}

fn load(cli: &Cli) -> Result<ProxyConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => ProxyConfig::default(),
    };

    config::apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;

    if let Some(port) = cli.port {
        config
            .listener
            .set_port(port)
            .map_err(|e| ConfigError::Validation(vec![e]))?;
    }
    if let Some(upstream) = &cli.upstream {
        config.upstream.base_url = upstream.clone();
    }

    config::validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load(&cli)?;

    logging::init(&config.observability);

    tracing::info!("fhir-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        request_timeout_secs = config.timeouts.request_secs,
        percent_encode_form = config.token.percent_encode_form,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // Validated above.
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    shutdown.trigger_on_signal();

    HttpServer::new(config)?.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
