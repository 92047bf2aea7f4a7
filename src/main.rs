use parkgate::config::{default_config_path, Config};
use parkgate::pipeline::Resolver;
use parkgate::server::ParkServer;
use parkgate::{PKG_NAME, VERSION};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("parkgate=debug".parse().expect("valid log directive")),
        )
        .init();

    let config = load_config()?;
    print_startup_banner(&config);

    let resolver = Resolver::from_config(&config).map_err(|e| {
        error!(error = %e, "Failed to build resolver");
        e
    })?;
    info!(drivers = ?resolver.registry(), "Driver registry ready");

    let bind_addr: SocketAddr = config.listen_address().parse().map_err(|e| {
        error!(bind = %config.server.bind, port = config.server.port, error = %e, "Invalid bind address");
        anyhow::anyhow!("Invalid bind address: {}", e)
    })?;

    // Create shutdown channel
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let server = ParkServer::new(bind_addr, Arc::new(resolver), shutdown_rx);
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server.run().await {
            error!(error = %e, "Server error");
        }
    });

    // Wait for shutdown signal (Ctrl+C or SIGTERM)
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received SIGINT (Ctrl+C), shutting down...");
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        info!("Received Ctrl+C, shutting down...");
    }

    let _ = shutdown_tx.send(true);

    if tokio::time::timeout(Duration::from_secs(5), server_handle).await.is_err() {
        warn!("Server did not stop within 5 seconds");
    }

    info!("Shutdown complete");
    Ok(())
}

/// Load the config named on the command line, or the per-user default.
///
/// An explicit path must exist; a missing default file means built-in defaults.
fn load_config() -> anyhow::Result<Config> {
    let explicit = std::env::args().nth(1).map(PathBuf::from);
    let config_path = explicit.clone().unwrap_or_else(default_config_path);

    if explicit.is_none() && !config_path.exists() {
        warn!(path = %config_path.display(), "No configuration file, using defaults");
        return Ok(Config::default());
    }

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path.display(), error = %e, "Failed to load configuration");
        e
    })?;
    info!(path = %config_path.display(), "Configuration loaded");
    Ok(config)
}

fn print_startup_banner(config: &Config) {
    info!(name = PKG_NAME, version = VERSION, "Starting parkgate");
    info!(
        bind = %config.server.bind,
        port = config.server.port,
        tld = %config.tld,
        "Server configuration"
    );
    info!(
        parked = ?config.parked_paths(),
        links = ?config.links_path(),
        default_site = ?config.default_site(),
        directory_listing = config.directory_listing,
        "Site roots"
    );
    if !config.tunnel_services.is_empty() {
        info!(services = ?config.tunnel_services, "Extra wildcard DNS services");
    }
}
