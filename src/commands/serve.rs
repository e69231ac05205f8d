use anyhow::{Context, Result};
use clap::ArgMatches;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use crate::core::collectors::{DeviceKind, EXPORTER_VERSION};
use crate::core::config::{DeviceEndpoint, ExporterConfig, Protocol, ProxyConfig};
use crate::core::server::MetricsServer;

pub fn execute(kind: DeviceKind, matches: &ArgMatches) -> Result<()> {
    let proxies = ProxyConfig::from_env()?;
    let config = config_from_matches(matches, proxies)?;

    crate::init_logging(config.debug);
    log::info!(
        "Starting {} Exporter (v{}) on port {}",
        kind,
        EXPORTER_VERSION,
        config.port
    );
    if let Some(proxies) = &config.endpoint.proxies {
        log::info!("Using proxies from Environment: {}", proxies);
    }

    let collector = kind
        .build(&config)
        .with_context(|| format!("Failed to set up {} collector", kind))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("exporter-worker")
        .build()
        .context("Failed to start async runtime")?;

    let bind_address = SocketAddr::from(([0, 0, 0, 0], config.port));
    let server = MetricsServer::new(bind_address, Arc::clone(&collector));
    runtime
        .block_on(server.run(shutdown_signal()))
        .with_context(|| format!("Metrics server on {} failed", bind_address))?;

    // The blocking HTTP client must not be dropped on a runtime thread
    drop(runtime);
    drop(collector);

    Ok(())
}

/// Build the exporter configuration from a device subcommand's matches
pub fn config_from_matches(
    matches: &ArgMatches,
    proxies: Option<ProxyConfig>,
) -> Result<ExporterConfig> {
    let host = matches
        .get_one::<String>("host")
        .context("Host argument is required")?;
    let protocol: Protocol = matches
        .get_one::<String>("protocol")
        .map(String::as_str)
        .unwrap_or("http")
        .parse()?;

    let mut config = ExporterConfig::new(
        DeviceEndpoint::new(host.as_str(), protocol).with_proxies(proxies.filter(|p| !p.is_empty())),
    );
    if let Some(port) = matches.get_one::<u16>("port") {
        config.port = *port;
    }
    if let Some(timeout) = matches.get_one::<u64>("timeout") {
        config.timeout = Duration::from_secs(*timeout);
    }
    config.debug = matches.get_flag("debug");

    Ok(config)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
}
