use attendance_dashboard::{AppState, Config, CredentialStore, HttpPortal, SessionController, router};
use std::net::SocketAddr;
use tokio::fs;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    if let Some(parent) = config.data_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    let portal = HttpPortal::new(config.portal_url.clone(), config.request_timeout)?;
    info!(portal = portal.endpoint(), "using attendance service");

    let controller = SessionController::new(
        portal,
        CredentialStore::file(config.data_path.clone()),
        config.progress,
    );
    if controller.startup().await.is_some() {
        info!("auto-resume started from stored credentials");
    }

    let app = router(AppState::new(controller));
    let addr = SocketAddr::new(config.host, config.port);

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
