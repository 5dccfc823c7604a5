//! Shared conversation record and its transitions
//!
//! The record is a single document per room. Every mutation goes through a
//! [`ConversationStore`], which applies it under the store's own lock.

mod pacing;
mod state;
mod store;

#[cfg(test)]
mod proptests;

pub use pacing::{Pacing, Readiness};
pub use state::{new_message_id, ConversationState, Location, Message};
#[cfg(test)]
pub use state::MessageType;
pub use store::{ConversationStore, MemoryStore, StoreError, StoreResult};
