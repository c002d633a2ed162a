//! Edge gateway (v1)
//!
//! Forwards every inbound request to a single backend service.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────────┐
//!                         │                   EDGE GATEWAY                    │
//!     Client Request      │  ┌─────────┐   ┌──────────┐   ┌──────────────┐   │
//!     ────────────────────┼─▶│  http   │──▶│ routing  │──▶│   security   │   │
//!                         │  │ server  │   │ resolver │   │   headers    │   │
//!                         │  └────┬────┘   └──────────┘   └──────┬───────┘   │
//!                         │       │ OPTIONS                      ▼           │
//!                         │       ▼                       ┌──────────────┐   │
//!                         │  ┌─────────┐                  │   upstream   │───┼──▶ Backend
//!                         │  │  cors   │                  │  dispatcher  │◀──┼───
//!                         │  └─────────┘                  └──────┬───────┘   │
//!     Client Response     │  ┌─────────┐   ┌──────────┐          │           │
//!     ◀───────────────────┼──│  cors   │◀──│ response │◀─────────┘           │
//!                         │  │annotate │   │ / error  │                      │
//!                         │  └─────────┘   └──────────┘                      │
//!                         └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use edge_gateway::config::{load_config, validation::validate_config, ConfigError, GatewayConfig};
use edge_gateway::lifecycle;
use edge_gateway::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "edge-gateway")]
#[command(about = "HTTP gateway forwarding all traffic to a single backend", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend base URL, overriding the config file.
    #[arg(long, env = "BACKEND_URL")]
    backend_url: Option<String>,

    /// Bind address, overriding the config file.
    #[arg(long)]
    bind: Option<String>,
}

fn load(cli: &Cli) -> Result<GatewayConfig, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };
    if let Some(url) = &cli.backend_url {
        config.backend.base_url = url.clone();
    }
    if let Some(bind) = &cli.bind {
        config.listener.bind_address = bind.clone();
    }
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("edge-gateway: {}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config.observability);
    tracing::info!("edge-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    match lifecycle::run(config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Gateway failed");
            ExitCode::FAILURE
        }
    }
}
