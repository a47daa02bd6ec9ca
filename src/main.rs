//! Mount proxy.
//!
//! Fronts one upstream site and serves it under a path prefix of the proxy's
//! own domain.
//!
//! ```text
//!     Client Request                                         Upstream
//!     ───────────▶ request id ─▶ director ─▶ hyper client ───────▶
//!                                                               │
//!     Client Response                                           ▼
//!     ◀─────────── request id ◀─ transformer ◀───────────── response
//!                                 (Location, gzip-aware HTML rewrite,
//!                                  Content-Length, framing headers)
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use mount_proxy::config;
use mount_proxy::lifecycle::{signals, Shutdown};
use mount_proxy::observability::{logging, metrics};
use mount_proxy::HttpServer;

#[derive(Parser)]
#[command(name = "mount-proxy")]
#[command(about = "Serve an upstream site under a path prefix of this host", long_about = None)]
struct Cli {
    /// Optional TOML configuration file. APP_DOMAIN and APP_PORT override it.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = config::load(cli.config.as_deref())?;

    logging::init(&config.observability.log_filter)?;

    tracing::info!("mount-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.url,
        mount = %config.mount.path,
        max_body_bytes = config.limits.max_body_bytes,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        signals::shutdown_signal().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
