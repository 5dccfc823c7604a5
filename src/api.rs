//! HTTP API
//!
//! Conversation state, turn generation and a raw prompt passthrough.

mod handlers;
mod types;

pub use handlers::create_router;

use crate::conversation::{ConversationStore, MemoryStore};
use crate::llm::LlmService;
use crate::runtime::{Room, RoomConfig};
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Durable room behind `/api/conversation` and `/api/generate-message`
    pub backrooms: Arc<Room>,
    /// In-memory room behind `/api/rotating-generate`
    pub rotating: Arc<Room>,
    pub llm: Option<Arc<dyn LlmService>>,
}

impl AppState {
    pub fn new(
        backrooms_store: Arc<dyn ConversationStore>,
        llm: Option<Arc<dyn LlmService>>,
    ) -> Self {
        Self::with_rooms(
            Room::new(RoomConfig::backrooms(), backrooms_store),
            Room::new(RoomConfig::rotating(), Arc::new(MemoryStore::new())),
            llm,
        )
    }

    pub fn with_rooms(backrooms: Room, rotating: Room, llm: Option<Arc<dyn LlmService>>) -> Self {
        Self {
            backrooms: Arc::new(backrooms),
            rotating: Arc::new(rotating),
            llm,
        }
    }

    pub fn llm(&self) -> Option<&dyn LlmService> {
        self.llm.as_deref()
    }
}
