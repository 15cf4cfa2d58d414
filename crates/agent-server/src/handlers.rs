//! HTTP Handlers

use std::collections::HashMap;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use agent_core::{AgentError, ToolCall, ToolResult, ToolSchema};
use commitment_advisor::tools::route_message;

use crate::state::AppState;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub market_source: String,
    pub ledger_source: Option<String>,
    pub tools: usize,
}

#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct MessageData {
    /// Rendered reply
    pub response: String,

    /// Tool that handled the message
    pub action: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub thought: Option<String>,

    /// Structured analysis, when the tool produced one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub data: MessageData,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>, code: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            success: false,
            error: error.into(),
            code: code.into(),
        }),
    )
}

fn agent_error(e: &AgentError) -> ApiError {
    let (status, code) = match e {
        AgentError::ToolNotFound(_) => (StatusCode::NOT_FOUND, "TOOL_NOT_FOUND"),
        AgentError::ToolValidation(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "TOOL_ERROR"),
    };
    if status.is_server_error() {
        tracing::error!("Tool error: {}", e);
    }
    api_error(status, e.user_message(), code)
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        market_source: state.advisor.market_source().to_string(),
        ledger_source: state.advisor.ledger_source().map(str::to_string),
        tools: state.tools.len(),
    })
}

/// Schemas of every registered tool
pub async fn list_tools(State(state): State<AppState>) -> Json<Vec<ToolSchema>> {
    Json(state.tools.schemas())
}

/// Route a free-text message to a tool and run it
pub async fn message_handler(
    State(state): State<AppState>,
    Json(payload): Json<MessageRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let text = payload.text.trim();
    if text.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Message text is required", "EMPTY_MESSAGE"));
    }

    let call = route_message(&state.parser, text);
    tracing::info!(action = %call.name, "routing message");

    let result = state.tools.execute(&call).await.map_err(|e| agent_error(&e))?;

    Ok(Json(MessageResponse {
        success: result.success,
        data: MessageData {
            response: result.output,
            action: call.name,
            thought: result.thought,
            analysis: result.data,
        },
    }))
}

/// Execute a tool with the JSON body as its arguments
pub async fn execute_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<ToolResult>, ApiError> {
    if !state.tools.contains(&name) {
        return Err(agent_error(&AgentError::ToolNotFound(name)));
    }

    let arguments: HashMap<String, serde_json::Value> = if body.iter().all(u8::is_ascii_whitespace) {
        HashMap::new()
    } else {
        serde_json::from_slice(&body).map_err(|e| {
            api_error(StatusCode::BAD_REQUEST, format!("Arguments must be a JSON object: {e}"), "INVALID_JSON")
        })?
    };

    let call = ToolCall {
        name,
        arguments,
        id: None,
    };
    let result = state.tools.execute(&call).await.map_err(|e| agent_error(&e))?;

    if result.success {
        Ok(Json(result))
    } else {
        Err(api_error(StatusCode::BAD_REQUEST, result.output, "TOOL_FAILED"))
    }
}
