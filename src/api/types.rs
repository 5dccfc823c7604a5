//! API request and response types

use crate::cast::Entity;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/conversation`
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ConversationAction {
    AddMessage {
        message: String,
        speaker: String,
        #[serde(default)]
        timestamp: Option<i64>,
    },
    SetGenerating {
        #[serde(rename = "isGenerating")]
        is_generating: bool,
    },
    UpdateLocation {
        level: String,
        #[serde(default)]
        sector: Option<String>,
    },
}

/// Request for a raw completion
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

/// Raw completion text
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub content: String,
}

/// Response for state updates
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Cast of one room
#[derive(Debug, Serialize)]
pub struct RoomCast {
    pub room: String,
    pub entities: Vec<Entity>,
}

#[derive(Debug, Serialize)]
pub struct EntitiesResponse {
    pub rooms: Vec<RoomCast>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            error: message.into(),
            details,
        }
    }
}
