//! Route handlers.

use axum::extract::State;
use axum::Json;
use courier_core::{DialogueState, ShipmentRecord, Turn};
use courier_dialogue::conversation::validate_user_message;
use courier_dialogue::DialogueError;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Health
// =============================================================================

/// Response body for GET /health.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    /// Name of the active extraction strategy.
    pub extractor: String,
}

/// GET /health - liveness and basic server info.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        extractor: state.engine.extractor_name().to_string(),
    })
}

// =============================================================================
// Chat
// =============================================================================

/// Request body for POST /chat.
#[derive(Debug, Deserialize, Serialize)]
pub struct ChatRequest {
    /// Full conversation so far, newest turn last.
    pub messages: Vec<Turn>,
    /// The record returned by the previous call, if any.
    #[serde(default)]
    pub shipment: Option<ShipmentRecord>,
}

/// Response body for POST /chat.
#[derive(Debug, Deserialize, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub shipment: ShipmentRecord,
    pub state: DialogueState,
    pub complete: bool,
}

/// POST /chat - produce the next assistant turn for a conversation.
///
/// An empty `messages` list returns the opening prompt. Extraction failures
/// come back as a normal 200 reply asking the user to resend.
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let limits = &state.config.dialogue;

    if req.messages.len() > limits.max_history_turns {
        return Err(DialogueError::HistoryTooLong(limits.max_history_turns).into());
    }
    if let Some(last) = req.messages.last().filter(|t| t.is_user()) {
        validate_user_message(&last.content, limits)?;
    }

    let previous = req.shipment.unwrap_or_default();
    let advance = state.engine.advance(&req.messages, &previous).await;

    tracing::debug!(
        turns = req.messages.len(),
        state = %advance.state,
        outcome = ?advance.outcome,
        "Chat turn handled"
    );

    let complete = advance.is_complete();
    Ok(Json(ChatResponse {
        reply: advance.reply,
        shipment: advance.record,
        state: advance.state,
        complete,
    }))
}
