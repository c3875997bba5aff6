mod config;
mod connections;
mod cv_match;
mod db;
mod errors;
mod llm_client;
mod models;
mod routes;
mod similarity;
mod state;
mod suggestions;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::cv_match::matcher::CvMatcher;
use crate::cv_match::stores::{LlmRelevanceScorer, PgCvStore, PgJobIndex};
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::suggestions::engine::SuggestionEngine;
use crate::suggestions::stores::{PgConnectionsStore, PgProfileStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Cofoundry API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Suggestion engine over the profile and connections stores
    let suggestions = Arc::new(SuggestionEngine::new(
        Arc::new(PgProfileStore::new(db.clone())),
        Arc::new(PgConnectionsStore::new(db.clone())),
    ));

    // CV matcher: full-text recall + LLM re-rank
    let cv_matcher = Arc::new(CvMatcher::new(
        Arc::new(PgCvStore::new(db.clone())),
        Arc::new(PgJobIndex::new(db.clone())),
        Arc::new(LlmRelevanceScorer::new(llm.clone())),
    ));

    // Build app state
    let state = AppState {
        db,
        suggestions,
        cv_matcher,
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
