//! netflow-listener standalone binary

mod config;
mod ingest;

use clap::Parser;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, prelude::*};

/// Respects RUST_LOG, defaults to info. Logs go to stderr so decoded flow
/// output can be piped separately from any future stdout use.
fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_ansi(false);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

#[tokio::main]
async fn main() {
    init_tracing();

    let cfg = config::ListenerConfig::parse();
    let metrics = Arc::new(ingest::IngestMetrics::default());
    let shutdown = CancellationToken::new();

    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to wait for shutdown signal: {}", err);
            return;
        }
        tracing::info!("shutdown requested");
        signal_shutdown.cancel();
    });

    let service = ingest::IngestService::new(cfg, metrics);
    if let Err(err) = service.run(shutdown).await {
        tracing::error!("ingestion error: {err:#}");
        std::process::exit(1);
    }
}
