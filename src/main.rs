use fitness_tracker::{router, AppState, Config, Storage, Tracker};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    let tracker = Tracker::open(Storage::new(config.data_dir.clone())).await?;
    let state = AppState::new(tracker);
    let app = router(state.clone());

    let addr = config.addr();
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let tracker = state.tracker.lock().await;
    if let Err(err) = tracker.flush().await {
        error!("failed to flush tracker state: {err}");
        return Err(err.into());
    }
    info!("shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
