//! Storage seam for conversation records

use super::ConversationState;
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] crate::db::DbError),
    #[error("Corrupt conversation record for {room}: {source}")]
    Corrupt {
        room: String,
        source: serde_json::Error,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Keyed storage for conversation records.
///
/// `modify` runs `apply` while holding the store's lock, so a read, a
/// decision and a write made inside it cannot interleave with another
/// `modify` on the same store. `None` means no record exists; leaving it
/// `None` writes nothing.
pub trait ConversationStore: Send + Sync {
    fn load(&self, room: &str) -> StoreResult<Option<ConversationState>>;

    fn modify(
        &self,
        room: &str,
        apply: &mut dyn FnMut(&mut Option<ConversationState>),
    ) -> StoreResult<Option<ConversationState>>;

    /// Release every in-flight flag; returns how many were set
    fn clear_generating(&self) -> StoreResult<usize>;
}

/// Process-lifetime store
#[derive(Default)]
pub struct MemoryStore {
    rooms: Mutex<HashMap<String, ConversationState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConversationStore for MemoryStore {
    fn load(&self, room: &str) -> StoreResult<Option<ConversationState>> {
        Ok(self.rooms.lock().unwrap().get(room).cloned())
    }

    fn modify(
        &self,
        room: &str,
        apply: &mut dyn FnMut(&mut Option<ConversationState>),
    ) -> StoreResult<Option<ConversationState>> {
        let mut rooms = self.rooms.lock().unwrap();
        let mut record = rooms.get(room).cloned();
        apply(&mut record);
        if let Some(state) = &record {
            rooms.insert(room.to_string(), state.clone());
        }
        Ok(record)
    }

    fn clear_generating(&self) -> StoreResult<usize> {
        let mut rooms = self.rooms.lock().unwrap();
        let mut cleared = 0;
        for state in rooms.values_mut().filter(|s| s.is_generating) {
            state.is_generating = false;
            cleared += 1;
        }
        Ok(cleared)
    }
}
