mod config;
mod errors;
mod llm_client;
mod models;
mod optimizer;
mod routes;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::optimizer::pipeline::Optimizer;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::InMemoryStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resumake API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the resume store
    let store = Arc::new(InMemoryStore::new());
    info!("In-memory resume store initialized");

    // Initialize the generation client and the optimization pipeline
    let llm = LlmClient::new(config.openrouter_api_key.clone(), config.app_url.clone());
    let optimizer = Arc::new(Optimizer::new(Arc::new(llm)));
    info!("Optimizer initialized (model: {})", llm_client::MODEL);

    // Build app state
    let state = AppState {
        store,
        optimizer,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
