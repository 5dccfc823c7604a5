//! Common types for LLM interactions

use serde::{Deserialize, Serialize};

/// LLM request
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub messages: Vec<LlmMessage>,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
}

impl LlmRequest {
    /// Token budget for a single in-character turn
    pub const TURN_MAX_TOKENS: u32 = 300;
    /// Sampling temperature for in-character turns
    pub const TURN_TEMPERATURE: f32 = 0.8;

    /// Single user message with the turn defaults
    pub fn user_prompt(prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![LlmMessage {
                role: MessageRole::User,
                content: vec![ContentBlock::text(prompt)],
            }],
            max_tokens: Self::TURN_MAX_TOKENS,
            temperature: Some(Self::TURN_TEMPERATURE),
        }
    }

    /// Text of the first user message, if any
    pub fn prompt_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == MessageRole::User)
            .and_then(|m| m.content.iter().find_map(ContentBlock::as_text))
    }
}

/// Message in conversation
#[derive(Debug, Clone)]
pub struct LlmMessage {
    pub role: MessageRole,
    pub content: Vec<ContentBlock>,
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
}

/// Content block in a message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
}

impl ContentBlock {
    pub fn text(s: impl Into<String>) -> Self {
        ContentBlock::Text { text: s.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBlock::Text { text } => Some(text),
        }
    }
}

/// LLM response
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub stop_reason: Option<String>,
    pub usage: Usage,
}

impl LlmResponse {
    /// Get text content from the response
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(ContentBlock::as_text)
            .collect::<Vec<_>>()
            .join("")
    }
}

/// Usage statistics
#[derive(Debug, Clone, Default)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}
