//! HTTP request handlers

use super::types::{
    ConversationAction, EntitiesResponse, ErrorResponse, GenerateRequest, GenerateResponse,
    RoomCast, SuccessResponse,
};
use super::AppState;
use crate::conversation::ConversationState;
use crate::llm::{LlmError, LlmErrorKind, LlmRequest};
use crate::runtime::{now_millis, AddedMessage, Room, TurnError, TurnOutcome};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use std::time::Duration;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Shared conversation record
        .route(
            "/api/conversation",
            get(get_conversation).post(conversation_action),
        )
        // Turn generation
        .route("/api/generate-message", post(generate_message))
        .route(
            "/api/rotating-generate",
            get(get_rotating).post(rotating_generate),
        )
        // Raw prompt passthrough
        .route("/api/generate", post(generate))
        // Cast info
        .route("/api/entities", get(list_entities))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Conversation State
// ============================================================

async fn get_conversation(
    State(state): State<AppState>,
) -> Result<Json<ConversationState>, AppError> {
    Ok(Json(state.backrooms.snapshot(now_millis())?))
}

async fn conversation_action(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, AppError> {
    let action: ConversationAction = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(error = %e, "Rejected conversation action");
        AppError::BadRequest("Invalid action".to_string())
    })?;
    let now = now_millis();
    let room = &state.backrooms;

    let response = match action {
        ConversationAction::AddMessage {
            message,
            speaker,
            timestamp,
        } => {
            let added: AddedMessage = room.add_message(&speaker, &message, timestamp, now)?;
            Json(added).into_response()
        }
        ConversationAction::SetGenerating { is_generating } => {
            room.set_generating(is_generating, now)?;
            Json(SuccessResponse { success: true }).into_response()
        }
        ConversationAction::UpdateLocation { level, sector } => {
            room.update_location(&level, sector.as_deref(), now)?;
            Json(SuccessResponse { success: true }).into_response()
        }
    };
    Ok(response)
}

// ============================================================
// Turn Generation
// ============================================================

async fn generate_message(State(state): State<AppState>) -> Result<Json<TurnOutcome>, AppError> {
    take_turn(&state, &state.backrooms).await
}

async fn get_rotating(State(state): State<AppState>) -> Result<Json<ConversationState>, AppError> {
    Ok(Json(state.rotating.snapshot(now_millis())?))
}

async fn rotating_generate(State(state): State<AppState>) -> Result<Json<TurnOutcome>, AppError> {
    // The in-memory record may not exist yet after a restart
    state.rotating.snapshot(now_millis())?;
    take_turn(&state, &state.rotating).await
}

async fn take_turn(
    state: &AppState,
    room: &Arc<Room>,
) -> Result<Json<TurnOutcome>, AppError> {
    let outcome = room
        .take_turn(state.llm(), now_millis())
        .await
        .inspect_err(|e| tracing::error!(room = %room.key(), error = %e, "Turn failed"))?;
    Ok(Json(outcome))
}

// ============================================================
// Raw Prompt Passthrough
// ============================================================

async fn generate(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<GenerateResponse>, AppError> {
    let prompt = serde_json::from_slice::<GenerateRequest>(&body)
        .inspect_err(|e| tracing::debug!(error = %e, "Rejected generate request"))
        .ok()
        .and_then(|req| req.prompt)
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Prompt is required".to_string()))?;

    let llm = state.llm().ok_or_else(|| AppError::Internal {
        error: "ANTHROPIC_API_KEY environment variable not set".to_string(),
        details: None,
    })?;

    let response = llm
        .complete(&LlmRequest::user_prompt(prompt))
        .await
        .map_err(|e| AppError::from_completion(e, "Failed to generate response"))?;

    Ok(Json(GenerateResponse {
        content: response.text(),
    }))
}

// ============================================================
// Cast Info
// ============================================================

async fn list_entities(State(state): State<AppState>) -> Json<EntitiesResponse> {
    let rooms = [&state.backrooms, &state.rotating]
        .into_iter()
        .map(|room| RoomCast {
            room: room.key().to_string(),
            entities: room.config().cast.entities.clone(),
        })
        .collect();
    Json(EntitiesResponse { rooms })
}

async fn get_version() -> &'static str {
    concat!("backrooms-chat ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

enum AppError {
    BadRequest(String),
    Internal {
        error: String,
        details: Option<String>,
    },
    /// Provider rejection passed through with its own status
    Upstream {
        status: StatusCode,
        error: String,
        retry_after: Option<Duration>,
    },
}

impl AppError {
    /// Map a failed completion, surfacing auth and rate-limit statuses.
    /// Anything else is a 500 carrying `fallback` and the provider message.
    fn from_completion(e: LlmError, fallback: &str) -> Self {
        match e.kind {
            LlmErrorKind::Auth => AppError::Upstream {
                status: StatusCode::UNAUTHORIZED,
                error: "Invalid API key".to_string(),
                retry_after: None,
            },
            LlmErrorKind::RateLimit => AppError::Upstream {
                status: StatusCode::TOO_MANY_REQUESTS,
                error: "Rate limit exceeded".to_string(),
                retry_after: e.retry_after,
            },
            _ => AppError::Internal {
                error: fallback.to_string(),
                details: Some(e.message),
            },
        }
    }
}

impl From<TurnError> for AppError {
    fn from(e: TurnError) -> Self {
        match e {
            TurnError::NoConversation => {
                AppError::BadRequest("No conversation data found".to_string())
            }
            TurnError::InvalidSpeaker(_) => AppError::BadRequest("Invalid speaker".to_string()),
            TurnError::NotConfigured => AppError::Internal {
                error: "ANTHROPIC_API_KEY environment variable not set".to_string(),
                details: None,
            },
            TurnError::Llm(e) => AppError::from_completion(e, "Failed to generate message"),
            TurnError::Store(e) => AppError::Internal {
                error: "Server error".to_string(),
                details: Some(e.to_string()),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(msg, None))).into_response()
            }
            AppError::Internal { error, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(error, details)),
            )
                .into_response(),
            AppError::Upstream {
                status,
                error,
                retry_after,
            } => {
                let mut response = (status, Json(ErrorResponse::new(error, None))).into_response();
                if let Some(delay) = retry_after {
                    let secs = delay.as_secs_f64().ceil().to_string();
                    if let Ok(value) = HeaderValue::from_str(&secs) {
                        response.headers_mut().insert(header::RETRY_AFTER, value);
                    }
                }
                response
            }
        }
    }
}
