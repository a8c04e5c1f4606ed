mod config;
mod errors;
mod extraction;
mod llm_client;
mod models;
mod pipeline;
mod profile;
mod research;
mod routes;
mod state;
#[cfg(test)]
mod testing;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::pipeline::Evaluator;
use crate::profile::fetcher::HttpFetcher;
use crate::research::search::{DisabledSearch, TavilySearch, WebSearch};
use crate::research::semantic::LlmSemanticExtractor;
use crate::routes::build_router;
use crate::state::AppState;

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

    info!("Starting Talent Scout v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);
    let semantic = Arc::new(LlmSemanticExtractor::new(llm));

    let search: Arc<dyn WebSearch> = match &config.tavily_api_key {
        Some(key) => {
            info!("Web search enabled");
            Arc::new(TavilySearch::new(key.clone())?)
        }
        None => {
            warn!("TAVILY_API_KEY not set, web search disabled");
            Arc::new(DisabledSearch)
        }
    };

    let fetcher = Arc::new(HttpFetcher::new()?);

    let evaluator = Evaluator::new(semantic, search, fetcher)
        .with_readme_delay(config.readme_fetch_delay);
    info!(
        "README fetch delay: {}ms",
        config.readme_fetch_delay.as_millis()
    );

    // Build app state
    let state = AppState {
        evaluator: Arc::new(evaluator),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
