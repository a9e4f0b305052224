//! session-gate server.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client Request
//!   ──────────────▶ request log ─▶ action log ─▶ session ─▶ authorization ─▶ static ─▶ handler
//!                       │                          │              │
//!                       │                          ▼              ▼
//!                       │                   ┌─────────────┐  401 false
//!                       │                   │session store│
//!                       │                   │memory/redis │
//!                       ▼                   └─────────────┘
//!                 one summary line per request
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use session_gate::config::{load_config, AppConfig};
use session_gate::http::{handlers, HttpServer};
use session_gate::observability::init_logging;

#[derive(Parser)]
#[command(name = "session-gate")]
#[command(about = "Web server with session-aware, role-based request pipeline", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    init_logging(&config.logging);
    tracing::info!("session-gate v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        security_enabled = config.security.enabled,
        redis_enabled = config.session.redis.enabled,
        static_contents_enabled = config.static_contents.enabled,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config, handlers::routes()).await?;
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
