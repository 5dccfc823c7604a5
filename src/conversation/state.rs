//! Conversation record types and their pure transitions

use super::pacing::{millis, Pacing, Readiness};
use crate::cast::{Cast, SYSTEM_SPEAKER};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Kind of a message, derived from its speaker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Entity,
    System,
}

/// One line of the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub speaker: String,
    pub content: String,
    /// Unix milliseconds
    pub timestamp: i64,
    #[serde(rename = "type")]
    pub message_type: MessageType,
}

impl Message {
    pub fn new(
        id: impl Into<String>,
        speaker: impl Into<String>,
        content: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        let speaker = speaker.into();
        let message_type = if speaker == SYSTEM_SPEAKER {
            MessageType::System
        } else {
            MessageType::Entity
        };
        Self {
            id: id.into(),
            speaker,
            content: content.into(),
            timestamp,
            message_type,
        }
    }

    pub fn is_system(&self) -> bool {
        self.message_type == MessageType::System
    }
}

/// `msg_<unix-ms>_<9 base36 chars>`
pub fn new_message_id<R: Rng + ?Sized>(now: i64, rng: &mut R) -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let suffix: String = (0..9)
        .map(|_| char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())]))
        .collect();
    format!("msg_{now}_{suffix}")
}

/// Where the entities currently are
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub level: String,
    pub sector: Option<String>,
}

impl Location {
    pub fn new(level: impl Into<String>, sector: Option<&str>) -> Self {
        Self {
            level: level.into(),
            sector: sector.map(String::from),
        }
    }
}

/// The shared conversation record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationState {
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Entity key of whoever speaks next
    pub current_speaker: String,
    #[serde(default)]
    pub message_count: u64,
    pub level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(default)]
    pub last_activity: i64,
    #[serde(default)]
    pub is_generating: bool,
    #[serde(default)]
    pub next_message_time: i64,
}

impl ConversationState {
    pub fn new(first_speaker: &str, location: Location, now: i64, pacing: &Pacing) -> Self {
        Self {
            messages: Vec::new(),
            current_speaker: first_speaker.to_string(),
            message_count: 0,
            level: location.level,
            sector: location.sector,
            last_activity: now,
            is_generating: false,
            next_message_time: now.saturating_add(millis(pacing.initial_delay)),
        }
    }

    /// Push a message, dropping the oldest entries beyond `cap`
    pub fn append(&mut self, message: Message, cap: usize) {
        self.messages.push(message);
        if self.messages.len() > cap {
            let excess = self.messages.len() - cap;
            self.messages.drain(..excess);
        }
        self.message_count += 1;
    }

    /// Record a completed entity turn: rotate, release the flag, reschedule.
    ///
    /// Rotation advances from `current_speaker`, not from the message's
    /// speaker, so externally posted entity lines keep the cycle moving.
    pub fn record_entity_turn(
        &mut self,
        message: Message,
        cast: &Cast,
        cap: usize,
        now: i64,
        gap: Duration,
    ) {
        self.append(message, cap);
        self.current_speaker = cast.next_after(&self.current_speaker).key.to_string();
        self.is_generating = false;
        self.next_message_time = now.saturating_add(millis(gap));
        self.last_activity = now;
    }

    /// Record an out-of-character notice; rotation and schedule are untouched
    pub fn record_system_message(&mut self, message: Message, cap: usize, now: i64) {
        self.append(message, cap);
        self.last_activity = now;
    }

    pub fn readiness(&self, now: i64) -> Readiness {
        if self.is_generating {
            Readiness::InFlight
        } else if now < self.next_message_time {
            Readiness::NotDue {
                wait_ms: self.next_message_time - now,
            }
        } else {
            Readiness::Due
        }
    }

    pub fn time_until_next(&self, now: i64) -> i64 {
        (self.next_message_time - now).max(0)
    }

    /// The last `n` messages, oldest first
    pub fn recent(&self, n: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }
}
