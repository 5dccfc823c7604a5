//! Property tests for conversation transitions

use super::*;
use crate::cast::{Cast, SYSTEM_SPEAKER};
use proptest::prelude::*;
use std::time::Duration;

#[derive(Debug, Clone)]
enum Step {
    Entity { content: String, gap_secs: u64 },
    System { content: String },
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        ("[a-z ]{0,20}", 10u64..=120).prop_map(|(content, gap_secs)| Step::Entity { content, gap_secs }),
        "[a-z ]{0,20}".prop_map(|content| Step::System { content }),
    ]
}

fn apply(state: &mut ConversationState, cast: &Cast, cap: usize, now: i64, step: Step) {
    match step {
        Step::Entity { content, gap_secs } => {
            let speaker = cast
                .get(&state.current_speaker)
                .map_or("UNKNOWN", |e| e.name);
            let message = Message::new(format!("msg_{now}"), speaker, content, now);
            state.record_entity_turn(message, cast, cap, now, Duration::from_secs(gap_secs));
        }
        Step::System { content } => {
            let message = Message::new(format!("msg_{now}"), SYSTEM_SPEAKER, content, now);
            state.record_system_message(message, cap, now);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // History never exceeds the room's cap, and the count never loses messages
    #[test]
    fn prop_history_bounded(
        steps in proptest::collection::vec(arb_step(), 0..80),
        cap in 1usize..60,
    ) {
        let cast = Cast::backrooms();
        let mut state = ConversationState::new(
            "ani", Location::new("Level 0", Some("C-7")), 0, &Pacing::scheduled(),
        );

        for (i, step) in steps.iter().cloned().enumerate() {
            apply(&mut state, &cast, cap, i64::try_from(i).unwrap() * 1_000, step);
            prop_assert!(state.messages.len() <= cap);
        }
        prop_assert_eq!(state.message_count, steps.len() as u64);
        prop_assert_eq!(state.messages.len(), steps.len().min(cap));
    }

    // Entity turns cycle through the cast in order; system notices never advance it
    #[test]
    fn prop_rotation_follows_entity_turns(
        steps in proptest::collection::vec(arb_step(), 0..60),
    ) {
        let cast = Cast::rotating();
        let mut state = ConversationState::new(
            cast.first().key, Location::new("Level 0", None), 0, &Pacing::cooldown(),
        );

        let mut entity_turns = 0usize;
        for (i, step) in steps.into_iter().enumerate() {
            if matches!(step, Step::Entity { .. }) {
                entity_turns += 1;
            }
            apply(&mut state, &cast, 20, i64::try_from(i).unwrap(), step);
            let expected = cast.entities[entity_turns % cast.entities.len()].key;
            prop_assert_eq!(state.current_speaker.as_str(), expected);
        }
    }

    // After any entity turn the room is idle and not due before the sampled gap
    #[test]
    fn prop_turn_releases_flag_and_schedules(
        now in 0i64..1_000_000_000,
        gap_secs in 10u64..=120,
    ) {
        let cast = Cast::backrooms();
        let mut state = ConversationState::new(
            "rudi", Location::new("Level 0", Some("C-7")), 0, &Pacing::scheduled(),
        );
        state.is_generating = true;

        let message = Message::new("m", "RUDI", "...", now);
        state.record_entity_turn(message, &cast, 50, now, Duration::from_secs(gap_secs));

        let gap_ms = i64::try_from(gap_secs).unwrap() * 1_000;
        prop_assert!(!state.is_generating);
        prop_assert_eq!(state.readiness(now), Readiness::NotDue { wait_ms: gap_ms });
        prop_assert!(state.readiness(now + gap_ms).is_due());
    }
}
