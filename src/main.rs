use std::net::SocketAddr;

use anyhow::Context;
use classbook::logging::{init_tracing, shutdown_tracer};
use classbook::metrics::{init_metrics, metrics_app};
use classbook::router::init_router;
use classbook::state::init_app_state;
use classbook_config::ServerConfig;
use dotenvy::dotenv;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    let state = init_app_state().await?;
    if state.jwt_config.uses_dev_secret() {
        warn!("JWT_SECRET is not set, using the development secret");
    }

    let mut app = init_router(state)?;
    if let Some(handle) = init_metrics()? {
        app = app.merge(metrics_app(handle));
    }

    let server = ServerConfig::from_env();
    let address = server.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

    info!(%address, "server listening");
    info!("Swagger UI at /swagger-ui, Scalar at /scalar");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    shutdown_tracer().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
