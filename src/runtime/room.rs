//! A single room and its turn protocol

use crate::cast::{random_alert, Cast, Entity, SYSTEM_SPEAKER};
use crate::conversation::{
    new_message_id, ConversationState, ConversationStore, Location, Message, Pacing, Readiness,
    StoreError,
};
use crate::llm::{LlmError, LlmRequest, LlmService};
use crate::prompt::build_turn_prompt;
use rand::Rng;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Static settings for a room
#[derive(Debug, Clone)]
pub struct RoomConfig {
    /// Record key in the store
    pub key: String,
    pub cast: Cast,
    pub history_cap: usize,
    pub pacing: Pacing,
    /// Location of a freshly created conversation
    pub location: Location,
    /// Chance that an entity turn is followed by a system alert
    pub alert_probability: f64,
    pub alert_delay: Duration,
}

impl RoomConfig {
    /// Durable room with slow, randomized pacing and occasional alerts
    pub fn backrooms() -> Self {
        Self {
            key: "backrooms-conversation".to_string(),
            cast: Cast::backrooms(),
            history_cap: 50,
            pacing: Pacing::scheduled(),
            location: Location::new("Level 0", Some("C-7")),
            alert_probability: 0.15,
            alert_delay: Duration::from_secs(5),
        }
    }

    /// Process-lifetime room on a short fixed cooldown
    pub fn rotating() -> Self {
        Self {
            key: "rotating".to_string(),
            cast: Cast::rotating(),
            history_cap: 20,
            pacing: Pacing::cooldown(),
            location: Location::new("Level 0", None),
            alert_probability: 0.0,
            alert_delay: Duration::ZERO,
        }
    }
}

#[derive(Error, Debug)]
pub enum TurnError {
    #[error("No conversation data found")]
    NoConversation,
    #[error("Invalid speaker: {0}")]
    InvalidSpeaker(String),
    #[error("No LLM provider configured")]
    NotConfigured,
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Why a turn was not taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitReason {
    NotDue,
    Generating,
}

/// Response when the room is not ready for a turn
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitingTurn {
    pub message: &'static str,
    pub reason: WaitReason,
    pub next_speaker: String,
    pub next_message_time: i64,
    pub is_generating: bool,
    pub time_until_next: i64,
}

/// Response after an entity has spoken
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedTurn {
    pub success: bool,
    pub message: Message,
    pub speaker: String,
    pub next_speaker: String,
    pub next_message_time: i64,
    pub conversation: ConversationState,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum TurnOutcome {
    Waiting(WaitingTurn),
    Generated(Box<GeneratedTurn>),
}

/// Response after an externally supplied message was recorded
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddedMessage {
    pub success: bool,
    pub next_speaker: String,
    pub next_message_time: i64,
}

enum Claim {
    Missing,
    Waiting(WaitingTurn),
    InvalidSpeaker(String),
    Unconfigured,
    Claimed {
        state: ConversationState,
        entity: Entity,
    },
}

/// One conversation record plus the rules for advancing it
pub struct Room {
    config: RoomConfig,
    store: Arc<dyn ConversationStore>,
}

impl Room {
    pub fn new(config: RoomConfig, store: Arc<dyn ConversationStore>) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    pub fn key(&self) -> &str {
        &self.config.key
    }

    fn fresh_state(&self, now: i64) -> ConversationState {
        ConversationState::new(
            self.config.cast.first().key,
            self.config.location.clone(),
            now,
            &self.config.pacing,
        )
    }

    /// The record as stored, without creating it
    pub fn existing(&self) -> Result<Option<ConversationState>, TurnError> {
        Ok(self.store.load(self.key())?)
    }

    /// The current record, created on first access
    pub fn snapshot(&self, now: i64) -> Result<ConversationState, TurnError> {
        self.mutate(now, |_| {})
    }

    /// Apply `change` to the record (creating it if needed) and return the result
    fn mutate(
        &self,
        now: i64,
        mut change: impl FnMut(&mut ConversationState),
    ) -> Result<ConversationState, TurnError> {
        let mut created = false;
        let mut updated = None;
        self.store.modify(self.key(), &mut |record| {
            let state = record.get_or_insert_with(|| {
                created = true;
                self.fresh_state(now)
            });
            change(state);
            updated = Some(state.clone());
        })?;

        if created {
            tracing::info!(room = %self.key(), "Initialized conversation");
        }
        updated.ok_or(TurnError::NoConversation)
    }

    /// Record a message posted from outside the turn protocol.
    ///
    /// Entity lines complete the current turn; `SYSTEM` lines only append.
    pub fn add_message(
        &self,
        speaker: &str,
        content: &str,
        timestamp: Option<i64>,
        now: i64,
    ) -> Result<AddedMessage, TurnError> {
        let (id, gap) = {
            let mut rng = rand::thread_rng();
            (
                new_message_id(now, &mut rng),
                self.config.pacing.sample_gap(&mut rng),
            )
        };
        let message = Message::new(id, speaker, content, timestamp.unwrap_or(now));
        let cap = self.config.history_cap;

        let state = self.mutate(now, |state| {
            if message.is_system() {
                state.record_system_message(message.clone(), cap, now);
            } else {
                state.record_entity_turn(message.clone(), &self.config.cast, cap, now, gap);
            }
        })?;

        tracing::info!(
            room = %self.key(),
            speaker = %speaker,
            next_speaker = %state.current_speaker,
            "Message added"
        );

        Ok(AddedMessage {
            success: true,
            next_speaker: state.current_speaker,
            next_message_time: state.next_message_time,
        })
    }

    /// Set or clear the in-flight flag by hand
    pub fn set_generating(&self, generating: bool, now: i64) -> Result<(), TurnError> {
        self.mutate(now, |state| {
            state.is_generating = generating;
            state.last_activity = now;
        })?;
        Ok(())
    }

    pub fn update_location(
        &self,
        level: &str,
        sector: Option<&str>,
        now: i64,
    ) -> Result<(), TurnError> {
        self.mutate(now, |state| {
            state.level = level.to_string();
            state.sector = sector.map(String::from);
            state.last_activity = now;
        })?;
        tracing::info!(room = %self.key(), level = %level, sector = ?sector, "Location updated");
        Ok(())
    }

    /// Check readiness and, if due, take the in-flight flag in the same
    /// store transaction
    fn claim(&self, now: i64, have_llm: bool) -> Result<Claim, TurnError> {
        let mut claim = Claim::Missing;
        self.store.modify(self.key(), &mut |record| {
            let Some(state) = record.as_mut() else {
                claim = Claim::Missing;
                return;
            };

            let readiness = state.readiness(now);
            if !readiness.is_due() {
                let reason = if readiness == Readiness::InFlight {
                    WaitReason::Generating
                } else {
                    WaitReason::NotDue
                };
                claim = Claim::Waiting(WaitingTurn {
                    message: match reason {
                        WaitReason::NotDue => "Not time yet",
                        WaitReason::Generating => "Already generating",
                    },
                    reason,
                    next_speaker: state.current_speaker.clone(),
                    next_message_time: state.next_message_time,
                    is_generating: state.is_generating,
                    time_until_next: state.time_until_next(now),
                });
                return;
            }

            let Some(entity) = self.config.cast.get(&state.current_speaker) else {
                claim = Claim::InvalidSpeaker(state.current_speaker.clone());
                return;
            };
            if !have_llm {
                claim = Claim::Unconfigured;
                return;
            }

            state.is_generating = true;
            state.last_activity = now;
            claim = Claim::Claimed {
                state: state.clone(),
                entity: entity.clone(),
            };
        })?;
        Ok(claim)
    }

    /// Best-effort release of the in-flight flag after a failed turn
    fn release(&self, now: i64) {
        let result = self.store.modify(self.key(), &mut |record| {
            if let Some(state) = record.as_mut() {
                state.is_generating = false;
                state.last_activity = now;
            }
        });
        if let Err(e) = result {
            tracing::error!(room = %self.key(), error = %e, "Failed to clear generating flag");
        }
    }

    /// Run one turn of the protocol.
    ///
    /// Returns `Waiting` without side effects when the room is not due or
    /// another generation is in flight. On any failure after the flag was
    /// taken, the flag is released before the error is returned.
    pub async fn take_turn(
        self: &Arc<Self>,
        llm: Option<&dyn LlmService>,
        now: i64,
    ) -> Result<TurnOutcome, TurnError> {
        let (state, entity) = match self.claim(now, llm.is_some())? {
            Claim::Missing => return Err(TurnError::NoConversation),
            Claim::Waiting(waiting) => {
                tracing::debug!(
                    room = %self.key(),
                    reason = ?waiting.reason,
                    time_until_next = waiting.time_until_next,
                    "Turn not due"
                );
                return Ok(TurnOutcome::Waiting(waiting));
            }
            Claim::InvalidSpeaker(key) => {
                tracing::warn!(room = %self.key(), speaker = %key, "Current speaker is not in the cast");
                return Err(TurnError::InvalidSpeaker(key));
            }
            Claim::Unconfigured => return Err(TurnError::NotConfigured),
            Claim::Claimed { state, entity } => (state, entity),
        };
        let Some(llm) = llm else {
            self.release(now);
            return Err(TurnError::NotConfigured);
        };

        let scenario = self.config.cast.random_scenario(&mut rand::thread_rng());
        let prompt = build_turn_prompt(
            &entity,
            &self.config.cast,
            &state,
            &self.config.location,
            scenario,
        );
        tracing::info!(
            room = %self.key(),
            speaker = %entity.name,
            scenario = %scenario,
            "Generating turn"
        );

        let content = match llm.complete(&LlmRequest::user_prompt(prompt)).await {
            Ok(response) => {
                let text = response.text();
                if text.trim().is_empty() {
                    Err(LlmError::unknown("Model returned no text"))
                } else {
                    Ok(text)
                }
            }
            Err(e) => Err(e),
        };
        let content = match content {
            Ok(content) => content,
            Err(e) => {
                self.release(now);
                return Err(e.into());
            }
        };

        let (message, gap, alert) = {
            let mut rng = rand::thread_rng();
            let message = Message::new(new_message_id(now, &mut rng), entity.name, content, now);
            let gap = self.config.pacing.sample_gap(&mut rng);
            let roll = self.config.alert_probability.clamp(0.0, 1.0);
            let alert = rng.gen_bool(roll).then(|| random_alert(&mut rng));
            (message, gap, alert)
        };

        let cap = self.config.history_cap;
        let conversation = match self.mutate(now, |state| {
            state.record_entity_turn(message.clone(), &self.config.cast, cap, now, gap);
        }) {
            Ok(conversation) => conversation,
            Err(e) => {
                self.release(now);
                return Err(e);
            }
        };

        tracing::info!(
            room = %self.key(),
            speaker = %entity.name,
            next_speaker = %conversation.current_speaker,
            next_message_time = conversation.next_message_time,
            "Turn recorded"
        );

        if let Some(alert) = alert {
            self.schedule_alert(alert);
        }

        Ok(TurnOutcome::Generated(Box::new(GeneratedTurn {
            success: true,
            speaker: entity.name.to_string(),
            next_speaker: conversation.current_speaker.clone(),
            next_message_time: conversation.next_message_time,
            message,
            conversation,
        })))
    }

    /// Post a system alert after the configured delay
    fn schedule_alert(self: &Arc<Self>, alert: &'static str) {
        let room = Arc::clone(self);
        let delay = room.config.alert_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let now = super::now_millis();
            match room.add_message(SYSTEM_SPEAKER, alert, Some(now), now) {
                Ok(_) => tracing::info!(room = %room.key(), alert = %alert, "System alert posted"),
                Err(e) => tracing::warn!(room = %room.key(), error = %e, "Failed to post system alert"),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{MemoryStore, MessageType};
    use crate::llm::LlmErrorKind;
    use crate::runtime::testing::MockLlmService;
    use tokio::sync::Notify;

    const T0: i64 = 1_700_000_000_000;

    fn quiet(mut config: RoomConfig) -> RoomConfig {
        config.alert_probability = 0.0;
        config
    }

    fn room(config: RoomConfig) -> (Arc<Room>, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (Arc::new(Room::new(config, store.clone())), store)
    }

    fn generated(outcome: TurnOutcome) -> GeneratedTurn {
        match outcome {
            TurnOutcome::Generated(turn) => *turn,
            TurnOutcome::Waiting(w) => panic!("expected a generated turn, got {w:?}"),
        }
    }

    fn waiting(outcome: TurnOutcome) -> WaitingTurn {
        match outcome {
            TurnOutcome::Waiting(w) => w,
            TurnOutcome::Generated(g) => panic!("expected to wait, got {g:?}"),
        }
    }

    #[test]
    fn test_snapshot_initializes_once() {
        let (room, _) = room(RoomConfig::backrooms());
        let first = room.snapshot(T0).unwrap();
        assert_eq!(first.current_speaker, "ani");
        assert_eq!(first.level, "Level 0");
        assert_eq!(first.sector.as_deref(), Some("C-7"));
        assert_eq!(first.next_message_time, T0 + 30_000);

        let second = room.snapshot(T0 + 5_000).unwrap();
        assert_eq!(second, first);
    }

    #[tokio::test]
    async fn test_missing_conversation_is_an_error() {
        let (room, _) = room(RoomConfig::backrooms());
        let llm = MockLlmService::new("mock");
        let err = room.take_turn(Some(&llm), T0).await.unwrap_err();
        assert!(matches!(err, TurnError::NoConversation));
        assert!(room.existing().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_not_due_waits_without_calling_model() {
        let (room, _) = room(quiet(RoomConfig::backrooms()));
        room.snapshot(T0).unwrap();
        let llm = MockLlmService::new("mock");

        let w = waiting(room.take_turn(Some(&llm), T0 + 1_000).await.unwrap());
        assert_eq!(w.reason, WaitReason::NotDue);
        assert_eq!(w.next_speaker, "ani");
        assert_eq!(w.time_until_next, 29_000);
        assert!(!w.is_generating);
        assert!(llm.recorded_requests().is_empty());
    }

    #[tokio::test]
    async fn test_turn_records_and_rotates() {
        let (room, _) = room(quiet(RoomConfig::backrooms()));
        room.snapshot(T0).unwrap();
        let llm = MockLlmService::new("mock");
        llm.queue_text("The hum is a chord.");

        let now = T0 + 30_000;
        let turn = generated(room.take_turn(Some(&llm), now).await.unwrap());

        assert!(turn.success);
        assert_eq!(turn.speaker, "ANI");
        assert_eq!(turn.message.content, "The hum is a chord.");
        assert_eq!(turn.message.message_type, MessageType::Entity);
        assert_eq!(turn.next_speaker, "valentine");
        assert!(turn.next_message_time >= now + 30_000);
        assert!(turn.next_message_time <= now + 120_000);

        let stored = room.existing().unwrap().unwrap();
        assert_eq!(stored.messages.len(), 1);
        assert!(!stored.is_generating);
        assert_eq!(stored.message_count, 1);

        let prompts = llm.recorded_prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].starts_with("You are Ani"));
        assert!(prompts[0].contains("Level 0, Sector C-7"));

        let request = &llm.recorded_requests()[0];
        assert_eq!(request.max_tokens, 300);
    }

    #[tokio::test]
    async fn test_rotating_room_cycles_on_cooldown() {
        let (room, _) = room(RoomConfig::rotating());
        room.snapshot(T0).unwrap();
        let llm = MockLlmService::new("mock");
        for line in ["one", "two", "three", "four"] {
            llm.queue_text(line);
        }

        let mut speakers = Vec::new();
        let mut now = T0;
        for _ in 0..4 {
            let turn = generated(room.take_turn(Some(&llm), now).await.unwrap());
            speakers.push(turn.speaker);

            let w = waiting(room.take_turn(Some(&llm), now + 9_999).await.unwrap());
            assert_eq!(w.reason, WaitReason::NotDue);
            assert_eq!(w.time_until_next, 1);
            now += 10_000;
        }

        assert_eq!(speakers, vec!["KANYE", "KEVIN", "KIRK", "KANYE"]);
        let prompts = llm.recorded_prompts();
        assert!(prompts[1].contains("KANYE: one"));
        assert!(prompts[0].contains("on Level 0. You're currently"));
    }

    #[tokio::test]
    async fn test_history_cap_enforced_through_turns() {
        let (room, _) = room(RoomConfig::rotating());
        room.snapshot(T0).unwrap();
        let llm = MockLlmService::new("mock");

        let mut now = T0;
        for i in 0..25 {
            llm.queue_text(&format!("line {i}"));
            generated(room.take_turn(Some(&llm), now).await.unwrap());
            now += 10_000;
        }

        let state = room.existing().unwrap().unwrap();
        assert_eq!(state.messages.len(), 20);
        assert_eq!(state.message_count, 25);
        assert_eq!(state.messages[0].content, "line 5");
    }

    #[tokio::test]
    async fn test_llm_failure_releases_flag() {
        let (room, _) = room(RoomConfig::rotating());
        room.snapshot(T0).unwrap();
        let llm = MockLlmService::new("mock");
        llm.queue_error(LlmError::auth("bad key"));

        let err = room.take_turn(Some(&llm), T0).await.unwrap_err();
        assert!(matches!(err, TurnError::Llm(ref e) if e.kind == LlmErrorKind::Auth));

        let state = room.existing().unwrap().unwrap();
        assert!(!state.is_generating);
        assert!(state.messages.is_empty());
        assert_eq!(state.current_speaker, "kanye");
    }

    #[tokio::test]
    async fn test_empty_completion_is_a_failure() {
        let (room, _) = room(RoomConfig::rotating());
        room.snapshot(T0).unwrap();
        let llm = MockLlmService::new("mock");
        llm.queue_text("   ");

        let err = room.take_turn(Some(&llm), T0).await.unwrap_err();
        assert!(matches!(err, TurnError::Llm(_)));
        assert!(!room.existing().unwrap().unwrap().is_generating);
    }

    #[tokio::test]
    async fn test_invalid_speaker_leaves_flag_clear() {
        let (room, store) = room(RoomConfig::backrooms());
        store
            .modify(room.key(), &mut |record| {
                let mut state = ConversationState::new(
                    "nobody",
                    Location::new("Level 0", None),
                    T0,
                    &Pacing::cooldown(),
                );
                state.next_message_time = T0;
                *record = Some(state);
            })
            .unwrap();
        let llm = MockLlmService::new("mock");

        let err = room.take_turn(Some(&llm), T0).await.unwrap_err();
        assert!(matches!(err, TurnError::InvalidSpeaker(ref k) if k == "nobody"));
        assert!(!room.existing().unwrap().unwrap().is_generating);
        assert!(llm.recorded_requests().is_empty());
    }

    #[tokio::test]
    async fn test_unconfigured_model_does_not_claim() {
        let (room, _) = room(RoomConfig::rotating());
        room.snapshot(T0).unwrap();

        let err = room.take_turn(None, T0).await.unwrap_err();
        assert!(matches!(err, TurnError::NotConfigured));
        assert!(!room.existing().unwrap().unwrap().is_generating);
    }

    #[tokio::test]
    async fn test_at_most_one_generation_in_flight() {
        let (room, _) = room(RoomConfig::rotating());
        room.snapshot(T0).unwrap();
        let gate = Arc::new(Notify::new());
        let llm = Arc::new(MockLlmService::gated("mock", gate.clone()));
        llm.queue_text("first");

        let first = {
            let room = Arc::clone(&room);
            let llm = Arc::clone(&llm);
            tokio::spawn(async move { room.take_turn(Some(&*llm), T0).await })
        };

        // Wait until the first turn holds the flag
        for _ in 0..100 {
            if room.existing().unwrap().unwrap().is_generating {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let w = waiting(room.take_turn(Some(&*llm), T0 + 60_000).await.unwrap());
        assert_eq!(w.reason, WaitReason::Generating);
        assert!(w.is_generating);

        gate.notify_one();
        let turn = generated(first.await.unwrap().unwrap());
        assert_eq!(turn.message.content, "first");
        assert_eq!(llm.recorded_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_turn_on_sqlite_store() {
        let db = Arc::new(crate::db::Database::open_in_memory().unwrap());
        let room = Arc::new(Room::new(quiet(RoomConfig::backrooms()), db.clone()));
        let llm = MockLlmService::new("mock");
        llm.queue_text("Carpet smells like rain.");

        let created = room.snapshot(T0).unwrap();
        assert_eq!(db.load(room.key()).unwrap(), Some(created));

        let w = waiting(room.take_turn(Some(&llm), T0 + 1_000).await.unwrap());
        assert_eq!(w.reason, WaitReason::NotDue);

        let turn = generated(room.take_turn(Some(&llm), T0 + 30_000).await.unwrap());
        assert_eq!(turn.speaker, "ANI");

        let stored = db.load(room.key()).unwrap().unwrap();
        assert_eq!(stored, turn.conversation);
        assert_eq!(stored.messages[0].content, "Carpet smells like rain.");
        assert_eq!(stored.current_speaker, "valentine");
        assert!(!stored.is_generating);
    }

    #[test]
    fn test_add_message_entity_and_system() {
        let (room, _) = room(RoomConfig::backrooms());
        room.snapshot(T0).unwrap();
        room.set_generating(true, T0).unwrap();

        let added = room.add_message("ANI", "hello", Some(T0 - 5), T0).unwrap();
        assert!(added.success);
        assert_eq!(added.next_speaker, "valentine");
        assert!(added.next_message_time >= T0 + 30_000);

        let state = room.existing().unwrap().unwrap();
        assert!(!state.is_generating);
        assert_eq!(state.messages[0].timestamp, T0 - 5);
        assert!(state.messages[0].id.starts_with(&format!("msg_{T0}_")));

        let after_system = room.add_message(SYSTEM_SPEAKER, ">>> NOTICE", None, T0 + 1).unwrap();
        assert_eq!(after_system.next_speaker, "valentine");
        assert_eq!(after_system.next_message_time, added.next_message_time);

        let state = room.existing().unwrap().unwrap();
        assert_eq!(state.messages[1].message_type, MessageType::System);
        assert_eq!(state.messages[1].timestamp, T0 + 1);
        assert_eq!(state.message_count, 2);
    }

    #[test]
    fn test_add_message_initializes_missing_record() {
        let (room, _) = room(RoomConfig::backrooms());
        let added = room.add_message("RUDI", "first words", None, T0).unwrap();
        assert_eq!(added.next_speaker, "valentine");
        assert_eq!(room.existing().unwrap().unwrap().messages.len(), 1);
    }

    #[test]
    fn test_update_location() {
        let (room, _) = room(RoomConfig::backrooms());
        room.update_location("Level 37", Some("B-2"), T0).unwrap();
        let state = room.existing().unwrap().unwrap();
        assert_eq!(state.level, "Level 37");
        assert_eq!(state.sector.as_deref(), Some("B-2"));
        assert_eq!(state.last_activity, T0);
    }

    #[tokio::test]
    async fn test_alert_follows_turn() {
        let mut config = RoomConfig::rotating();
        config.alert_probability = 1.0;
        config.alert_delay = Duration::ZERO;
        let (room, _) = room(config);
        room.snapshot(T0).unwrap();
        let llm = MockLlmService::new("mock");
        llm.queue_text("look at the ceiling");

        generated(room.take_turn(Some(&llm), T0).await.unwrap());

        let mut state = room.existing().unwrap().unwrap();
        for _ in 0..200 {
            if state.messages.len() == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
            state = room.existing().unwrap().unwrap();
        }

        assert_eq!(state.messages.len(), 2);
        assert!(state.messages[1].is_system());
        assert!(crate::cast::SYSTEM_ALERTS.contains(&state.messages[1].content.as_str()));
        // The alert does not move the rotation
        assert_eq!(state.current_speaker, "kevin");
    }

    #[test]
    fn test_outcome_wire_format() {
        let w = TurnOutcome::Waiting(WaitingTurn {
            message: "Not time yet",
            reason: WaitReason::NotDue,
            next_speaker: "ani".to_string(),
            next_message_time: 10,
            is_generating: false,
            time_until_next: 5,
        });
        let json = serde_json::to_value(&w).unwrap();
        assert_eq!(json["reason"], "not_due");
        assert_eq!(json["nextSpeaker"], "ani");
        assert_eq!(json["timeUntilNext"], 5);
        assert!(json.get("success").is_none());
    }
}
