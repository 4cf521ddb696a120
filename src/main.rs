use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use verixa_backend::core::config::AppConfig;
use verixa_backend::core::logging;
use verixa_backend::server::router;
use verixa_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    logging::init(&config);

    let bind_addr = format!("127.0.0.1:{}", config.port);
    let state = AppState::new(config);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;

    tracing::info!("Listening on {}", addr);

    let app: Router = router::router(state);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
