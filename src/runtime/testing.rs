//! Mock implementations for testing

use crate::llm::{ContentBlock, LlmError, LlmRequest, LlmResponse, LlmService, Usage};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Mock LLM service that returns queued responses
pub struct MockLlmService {
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    model_id: String,
    /// Record of all requests made
    pub requests: Mutex<Vec<LlmRequest>>,
    /// When set, each call waits for a permit before answering
    gate: Option<Arc<Notify>>,
}

impl MockLlmService {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            model_id: model_id.into(),
            requests: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Mock whose calls block until `gate` is notified
    pub fn gated(model_id: impl Into<String>, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(model_id)
        }
    }

    pub fn text_response(text: &str) -> LlmResponse {
        LlmResponse {
            content: vec![ContentBlock::text(text)],
            stop_reason: Some("end_turn".to_string()),
            usage: Usage {
                input_tokens: 100,
                output_tokens: 20,
            },
        }
    }

    /// Queue a successful text response
    pub fn queue_text(&self, text: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(Self::text_response(text)));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Prompt text of every recorded request
    pub fn recorded_prompts(&self) -> Vec<String> {
        self.recorded_requests()
            .iter()
            .filter_map(|r| r.prompt_text().map(String::from))
            .collect()
    }
}

#[async_trait]
impl LlmService for MockLlmService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
