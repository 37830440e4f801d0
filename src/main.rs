//! A2A agent proxy.
//!
//! Exposes one upstream Kibana A2A agent behind a fixed path, injecting the
//! server-held API key and pointing the agent card back at the proxy.
//!
//! ```text
//!     Client                          a2a-proxy                          Kibana
//!  ────────────   GET  <path>.json   ┌──────────────────────────┐   GET  api/chat/a2a/<id>.json
//!               ────────────────────▶│ header filter            │──────────────────────────────▶
//!                 POST <path>        │ + Authorization: ApiKey  │   POST api/chat/a2a/<id>
//!               ────────────────────▶│ timeout → 504, error→502 │──────────────────────────────▶
//!               ◀────────────────────│ agent card url rewrite   │◀──────────────────────────────
//!                                    └──────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use a2a_proxy::config::loader::{self, ConfigError};
use a2a_proxy::config::validation::validate_config;
use a2a_proxy::observability::{logging, metrics};
use a2a_proxy::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "a2a-proxy")]
#[command(about = "Reverse proxy for a single Kibana A2A agent", long_about = None)]
struct Cli {
    /// Optional TOML file; environment variables override its values.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listener address, overrides BIND_ADDRESS.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is normal outside development.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let mut config = loader::load(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init(&config.observability);
    tracing::info!("a2a-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    if let Err(errors) = validate_config(&config) {
        for err in &errors {
            if err.is_fatal() {
                tracing::error!(error = %err, "Invalid configuration");
            } else {
                tracing::warn!(error = %err, "Configuration problem, agent routes will fail until fixed");
            }
        }
        let fatal: Vec<_> = errors.into_iter().filter(|e| e.is_fatal()).collect();
        if !fatal.is_empty() {
            return Err(ConfigError::Validation(fatal).into());
        }
    }

    if config.agent.allowed_hosts.is_empty() {
        tracing::warn!("ALLOWED_KBN_HOSTS is empty, any upstream host is accepted");
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        agent_path = %config.public.path,
        public_agent_url = %config.public.agent_url(),
        request_timeout_secs = config.timeouts.request().as_secs_f64(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
