use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use nutrigen::assets::AssetPipeline;
use nutrigen::config::Config;
use nutrigen::handlers::{router, AppState};
use nutrigen::ingredient_api::SpoonacularClient;
use nutrigen::storage::SupabaseStorage;
use nutrigen::transport::GeminiTransport;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = Arc::new(Config::load());

    let model = Arc::new(GeminiTransport::new(
        config.gemini.api_key.clone(),
        config.gemini.request_timeout(),
    )?);
    let store = Arc::new(SupabaseStorage::new(&config.storage));
    let ingredient_api = Arc::new(SpoonacularClient::new(&config.spoonacular));
    let assets = Arc::new(AssetPipeline::new(
        model.clone(),
        store,
        ingredient_api,
        &config,
    ));

    let state = AppState::new(config.clone(), model, assets);
    let router = router(state);

    let bind: SocketAddr = config.server.bind.parse()?;
    let listener = tokio::net::TcpListener::bind(bind).await?;
    tracing::info!(%bind, "Starting nutrigen server");

    axum::serve(listener, router).await?;
    Ok(())
}
