use meetup_site::{AppState, Config, Gateway, LocalStore, router};
use std::net::SocketAddr;
use tokio::fs;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env()?;
    if let Some(parent) = config.data_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let store = LocalStore::open(config.data_path.clone()).await;
    let gateway = Gateway::new(config.gateway_url.clone())?;
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!(
        gateway = %gateway.url(),
        feedback = config.features.feedback,
        gallery = config.features.gallery,
        "starting meetup site"
    );

    let app = router(AppState::new(config, gateway, store));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
