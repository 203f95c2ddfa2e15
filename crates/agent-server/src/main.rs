//! Scanner Assistant HTTP Server
//!
//! Axum server in front of the tool-calling agent. Each user gets their own
//! conversation; scans and plans go through the same loop with canned
//! prompts.

mod config;
mod handlers;
mod state;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use agent_core::AgentBuilder;
use agent_runtime::AnthropicProvider;
use scanner_advisor::{ADVISOR_PROMPT, BackendConfig, HttpBackendClient, ScannerBackend, scanner_tools};

use crate::config::ServerConfig;
use crate::handlers::{chat_handler, health_check, plan_handler, reset_handler, scan_handler};
use crate::state::AppState;

fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/chat", post(chat_handler))
        .route("/api/chat/reset", post(reset_handler))
        .route("/api/scan", post(scan_handler))
        .route("/api/plan", post(plan_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let server = ServerConfig::from_env();

    let provider = Arc::new(AnthropicProvider::from_env()?);
    tracing::info!(model = %server.model, "✓ Anthropic provider ready");

    let backend_config = BackendConfig::from_env();
    match &backend_config.base_url {
        Some(url) => tracing::info!(%url, auth = backend_config.auth.is_some(), "✓ Backend configured"),
        None => {
            tracing::warn!("⚠ BACKEND_URL not set - scanner tools will report a configuration error");
        }
    }
    let backend_configured = backend_config.is_configured();
    let backend: Arc<dyn ScannerBackend> = Arc::new(HttpBackendClient::new(backend_config)?);

    let mut builder = AgentBuilder::new()
        .provider(provider)
        .tools(scanner_tools(backend))
        .system_prompt(ADVISOR_PROMPT)
        .model(server.model.clone())
        .max_rounds(server.max_rounds);
    if let Some(limit) = server.exchange_timeout {
        builder = builder.exchange_timeout(limit);
    }
    let agent = builder.build()?;

    tracing::info!("Registered {} tools:", agent.tools().len());
    for name in agent.tools().names() {
        tracing::info!("  • {}", name);
    }

    let app = router(AppState::new(agent, backend_configured));

    let listener = tokio::net::TcpListener::bind(&server.bind_addr).await?;

    tracing::info!("🚀 scanner assistant running on http://{}", server.bind_addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health          - Health check");
    tracing::info!("  POST /api/chat        - Send message");
    tracing::info!("  POST /api/chat/reset  - Clear conversation");
    tracing::info!("  POST /api/scan        - Top signals for a timeframe");
    tracing::info!("  POST /api/plan        - Trading plan (?daily=true for the short one)");

    axum::serve(listener, app).await?;

    Ok(())
}
