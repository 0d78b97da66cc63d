use anyhow::Result;
use beacon_server::{RelayService, ServerConfig, app, run_heartbeat};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env();
    let service = RelayService::new();

    tokio::spawn(run_heartbeat(
        service.registry().clone(),
        config.heartbeat_interval,
    ));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Signaling server listening on http://{}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app(service)).await?;

    Ok(())
}
