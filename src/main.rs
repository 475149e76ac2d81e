//! Portfolio server: picks a storage backend from the environment, seeds defaults,
//! and serves the API plus uploaded files.

use portfolio_api::{app, seed_defaults, store, AppState, ServerConfig, UploadStore};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("portfolio_api=info,tower_http=info")),
        )
        .init();

    let config = ServerConfig::from_env();
    let store = store::open(&config).await?;
    seed_defaults(store.as_ref()).await?;
    let uploads = UploadStore::new(&config.upload_dir, config.max_upload_bytes).await?;
    let state = AppState::new(store, uploads);

    let app = app(state, config.request_body_limit());
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
