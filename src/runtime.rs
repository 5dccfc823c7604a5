//! Room coordinators
//!
//! A room owns one conversation record and runs the turn protocol against
//! it: check readiness, claim the in-flight flag, ask the model for the
//! current speaker's line, record it and rotate.

mod room;

#[cfg(test)]
pub mod testing;

pub use room::{AddedMessage, Room, RoomConfig, TurnError, TurnOutcome};

/// Current wall-clock time in unix milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
