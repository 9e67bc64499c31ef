use clap::Parser;
use emberdns_domain::CliOverrides;
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

mod bootstrap;
mod di;

#[derive(Parser)]
#[command(name = "emberdns")]
#[command(version)]
#[command(about = "emberdns - caching, rate-limited DNS forwarding server")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// DNS server port
    #[arg(short = 'p', long)]
    port: Option<u16>,

    /// Bind address
    #[arg(short = 'b', long)]
    bind: Option<String>,

    /// Upstream resolver address (host:port)
    #[arg(short = 'u', long)]
    upstream: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        dns_port: cli.port,
        bind_address: cli.bind.clone(),
        upstream: cli.upstream.clone(),
        log_level: cli.log_level.clone(),
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;
    bootstrap::init_logging(&config);

    info!("Starting emberdns v{}", env!("CARGO_PKG_VERSION"));

    let services = di::DnsServices::new(&config)?;

    let dns_addr: SocketAddr = format!("{}:{}", config.server.bind_address, config.server.dns_port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid bind address: {}", e))?;

    let shutdown = CancellationToken::new();
    let server = emberdns_infrastructure::server::UdpServer::bind(
        dns_addr,
        services.handler_use_case,
        shutdown.clone(),
    )
    .await?;

    let shutdown_trigger = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
            return;
        }
        info!("Interrupt received, shutting down");
        shutdown_trigger.cancel();
    });

    server.run().await?;

    if let Some(cache) = &services.cache {
        let stats = cache.metrics();
        info!(
            entries = cache.len(),
            hits = stats.hits,
            misses = stats.misses,
            hit_rate = format!("{:.1}%", stats.hit_rate * 100.0),
            evictions = stats.evictions,
            "Final cache statistics"
        );
    }

    info!("Server shutdown complete");
    Ok(())
}
