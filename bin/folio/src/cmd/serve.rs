//! Serve command - builds the site, then serves it with the stats API

use std::{net::SocketAddr, path::Path, time::Instant};

use color_eyre::eyre::{Result, WrapErr};
use folio_core::Config;
use tokio::net::TcpListener;

use super::build::{build_site, print_stats};
use crate::server::{AppState, create_router};

/// Run the serve command.
pub async fn run(config_path: &Path, port: Option<u16>) -> Result<()> {
    let mut config =
        Config::load_with_env(config_path).wrap_err("Failed to load configuration")?;
    if let Some(port) = port {
        config.server.port = port;
    }

    let start = Instant::now();
    let (output, stats) = build_site(&config, None)?;
    print_stats(&stats, &output, start.elapsed().as_secs_f64());

    let state = AppState::from_config(&config).wrap_err("Failed to set up stats sources")?;
    let app = create_router(&output, state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .wrap_err("Invalid server address")?;
    let listener = TcpListener::bind(addr)
        .await
        .wrap_err_with(|| format!("Failed to bind to {addr}"))?;

    println!("  Serving at http://{addr}");
    println!("  Press Ctrl+C to stop");
    tracing::info!(%addr, output = %output.display(), "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
        })
        .await
        .wrap_err("Server error")?;

    Ok(())
}
