//! Edge router binary.
//!
//! ```text
//!     Client ──▶ listener ──▶ classify ──┬─▶ /api/...     ──▶ API origin
//!                                        ├─▶ /<route>/... ──▶ site origin (SPA fallback)
//!                                        ├─▶ /            ──▶ 302 default route
//!                                        └─▶ anything else ──▶ 404 page
//! ```

use std::path::PathBuf;

use clap::Parser;

use edge_router::config::loader::{load_config_with, load_not_found_page};
use edge_router::config::ObservabilityConfig;
use edge_router::lifecycle::startup;
use edge_router::observability::logging::init_tracing;

#[derive(Parser)]
#[command(name = "edge-router")]
#[command(about = "Path-based HTTP edge router with SPA fallback", long_about = None)]
struct Cli {
    /// Configuration file
    #[arg(short, long, env = "EDGE_ROUTER_CONFIG", default_value = "edge-router.toml")]
    config: PathBuf,

    /// Listen address, overriding `listener.bind_address`
    #[arg(short, long, env = "EDGE_ROUTER_BIND")]
    bind: Option<String>,

    /// Validate the configuration and exit
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let bind = cli.bind;
    let loaded = load_config_with(&cli.config, |config| {
        if let Some(bind) = bind {
            config.listener.bind_address = bind;
        }
    });

    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            init_tracing(&ObservabilityConfig::default());
            tracing::error!(path = %cli.config.display(), error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };

    init_tracing(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        "edge-router starting"
    );

    let not_found_page = match load_not_found_page(&config) {
        Ok(page) => page,
        Err(e) => {
            tracing::error!(error = %e, "Failed to read not-found page");
            return Err(e.into());
        }
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        routes = config.routes.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if cli.check {
        tracing::info!("Configuration OK");
        return Ok(());
    }

    if let Err(e) = startup::run(config, not_found_page).await {
        tracing::error!(error = %e, "Edge router failed");
        return Err(e.into());
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
