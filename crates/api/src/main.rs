use std::sync::Arc;

use anyhow::Context;

use accountsys_api::app::{build_app, services};
use accountsys_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Config first: `.env` may carry RUST_LOG / LOG_FORMAT.
    let config = AppConfig::from_env().context("invalid configuration")?;
    accountsys_observability::init();

    let services = services::build_services(&config.store)
        .await
        .context("failed to initialise stores")?;
    let app = build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
