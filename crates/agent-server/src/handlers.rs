//! HTTP Handlers

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use agent_core::{AgentError, SessionId};
use scanner_advisor::{DAILY_PLAN_PROMPT, PLAN_PROMPT, Timeframe, scan_prompt};

use crate::state::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub model: String,
    pub tools: Vec<String>,
    pub backend_configured: bool,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub message: String,
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub timeframe: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PlanQuery {
    /// Short scheduled-broadcast variant
    #[serde(default)]
    pub daily: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PlanResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

fn bad_request(error: impl Into<String>, code: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
        }),
    )
}

/// Map a loop fault to a response; the detail stays in the log
fn agent_failure(e: &AgentError) -> ApiError {
    let (status, code) = match e {
        AgentError::Provider(_)
        | AgentError::ProviderUnavailable(_)
        | AgentError::RateLimited(_)
        | AgentError::Auth(_)
        | AgentError::Timeout(_)
        | AgentError::MaxRounds(_) => (StatusCode::BAD_GATEWAY, "MODEL_ERROR"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "AGENT_ERROR"),
    };
    tracing::error!(error = %e, code, "Exchange failed");

    (
        status,
        Json(ErrorResponse {
            error: e.user_message(),
            code: code.into(),
        }),
    )
}

fn identity(user_id: Option<String>) -> SessionId {
    user_id
        .filter(|id| !id.trim().is_empty())
        .map_or_else(SessionId::new, SessionId::from_string)
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        model: state.agent.config().generation.model.clone(),
        tools: state.agent.tools().names().into_iter().map(String::from).collect(),
        backend_configured: state.backend_configured,
    })
}

/// One exchange in the user's conversation
pub async fn chat_handler(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    if payload.message.trim().is_empty() {
        return Err(bad_request("Message must not be empty", "EMPTY_MESSAGE"));
    }

    let id = identity(payload.user_id);
    let message = state
        .agent
        .exchange(&id, &payload.message)
        .await
        .map_err(|e| agent_failure(&e))?;

    Ok(Json(ChatResponse {
        message,
        user_id: id.to_string(),
    }))
}

/// Clear the user's conversation
pub async fn reset_handler(
    State(state): State<AppState>,
    Json(payload): Json<ResetRequest>,
) -> Result<StatusCode, ApiError> {
    let id = SessionId::from_string(payload.user_id);
    state.agent.reset(&id).await.map_err(|e| agent_failure(&e))?;
    tracing::info!(user = %id, "Conversation cleared");
    Ok(StatusCode::NO_CONTENT)
}

/// Top signals for a timeframe, inside the user's conversation
pub async fn scan_handler(
    State(state): State<AppState>,
    Json(payload): Json<ScanRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let timeframe = match payload.timeframe.as_deref() {
        None => Timeframe::default(),
        Some(tf) => tf.parse::<Timeframe>().map_err(|_| {
            bad_request(
                format!("⚠️ Invalid timeframe. Use: {}", Timeframe::valid_values()),
                "INVALID_TIMEFRAME",
            )
        })?,
    };

    let id = identity(payload.user_id);
    let message = state
        .agent
        .exchange(&id, &scan_prompt(timeframe))
        .await
        .map_err(|e| agent_failure(&e))?;

    Ok(Json(ChatResponse {
        message,
        user_id: id.to_string(),
    }))
}

/// Trading plan from a fresh, discarded conversation
pub async fn plan_handler(
    State(state): State<AppState>,
    Query(query): Query<PlanQuery>,
) -> Result<Json<PlanResponse>, ApiError> {
    let prompt = if query.daily { DAILY_PLAN_PROMPT } else { PLAN_PROMPT };
    let message = state.agent.ask(prompt).await.map_err(|e| agent_failure(&e))?;
    Ok(Json(PlanResponse { message }))
}
