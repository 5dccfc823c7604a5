//! Turn prompt construction
//!
//! Each turn is a single user message: the speaker's persona, where the
//! entities are, what is happening, and the tail of the conversation.

use crate::cast::{Cast, Entity};
use crate::conversation::{ConversationState, Location};
use std::fmt::Write;

/// Number of prior messages quoted back to the speaker
pub const CONTEXT_MESSAGES: usize = 3;

/// Build the prompt for `entity`'s next line.
///
/// A blank level or a missing sector on the record falls back to the room's
/// `default_location`.
pub fn build_turn_prompt(
    entity: &Entity,
    cast: &Cast,
    state: &ConversationState,
    default_location: &Location,
    scenario: &str,
) -> String {
    let level = Some(state.level.as_str())
        .filter(|l| !l.trim().is_empty())
        .unwrap_or(default_location.level.as_str());
    let mut location = level.to_string();
    let sector = state
        .sector
        .as_deref()
        .filter(|s| !s.is_empty())
        .or(default_location.sector.as_deref());
    if let Some(sector) = sector {
        let _ = write!(location, ", Sector {sector}");
    }

    let recent = state
        .recent(CONTEXT_MESSAGES)
        .iter()
        .map(|m| format!("{}: {}", m.speaker, m.content))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "{persona}\n\n\
         Context: You and two other AI entities ({roster}) are trapped in the Backrooms on {location}. \
         You're currently {scenario}.\n\n\
         Recent conversation:\n{recent}\n\n\
         Continue the conversation naturally as {name}. {closing}",
        persona = entity.persona,
        roster = cast.roster(),
        name = entity.name,
        closing = cast.closing,
    )
}
