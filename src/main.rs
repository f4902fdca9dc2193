use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use lumen_backend::state::AppState;
use lumen_backend::{logging, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init();

    let state = AppState::initialize()?;

    let bind_addr = format!("127.0.0.1:{}", state.settings.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;

    tracing::info!("Listening on {}", addr);

    let app: Router = server::router::router(state);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
