// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

use proofsheet_server::{ServerConfig, router};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    info!("Starting Proofsheet conversion server v{}", env!("CARGO_PKG_VERSION"));

    let config = ServerConfig::load()?;
    info!(
        host = %config.host,
        port = config.port,
        max_upload_bytes = config.max_upload_bytes,
        fallback = %config.fallback_program,
        "Configuration loaded"
    );

    let addr = format!("{}:{}", config.host, config.port);
    let app = router(config);
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let format = fmt::format().with_target(true).compact();

    // RUST_LOG wins; otherwise info for everything.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().event_format(format))
        .with(filter)
        .init();
}
