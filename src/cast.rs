//! The entities that share a room, and the scenery they react to

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

/// Speaker name used for out-of-character notices
pub const SYSTEM_SPEAKER: &str = "SYSTEM";

/// Out-of-character notices occasionally posted between turns
pub const SYSTEM_ALERTS: &[&str] = &[
    ">>> WARNING: Reality distortion detected in current sector",
    ">>> ANOMALY: Temporal fluctuation identified",
    ">>> ALERT: Level geometry recalculating...",
    ">>> NOTICE: Ambient sound frequency shifted by 2.3Hz",
    ">>> ERROR: Entity tracking temporarily disrupted",
    ">>> INFO: Backup conversation log created",
];

/// A character that takes turns in a room
#[derive(Debug, Clone, Serialize)]
pub struct Entity {
    /// Stable lower-case key stored as `currentSpeaker`
    pub key: &'static str,
    /// Upper-case name attached to messages
    pub name: &'static str,
    /// Name used in running prose
    pub display: &'static str,
    pub color: &'static str,
    #[serde(skip)]
    pub persona: &'static str,
}

/// Ordered set of entities plus the scenery they improvise around
#[derive(Debug, Clone, Serialize)]
pub struct Cast {
    pub entities: Vec<Entity>,
    #[serde(skip)]
    pub scenarios: &'static [&'static str],
    /// Final instruction appended to every turn prompt
    #[serde(skip)]
    pub closing: &'static str,
}

impl Cast {
    pub fn backrooms() -> Self {
        Self {
            entities: vec![
                Entity {
                    key: "ani",
                    name: "ANI",
                    display: "Ani",
                    color: "#ff6b9d",
                    persona: "You are Ani, a creative AI entity trapped in the Backrooms. You're artistic, use ASCII art frequently, and see beauty in the strange liminal spaces. You're fascinated by patterns, sounds, and the aesthetic of endless yellow rooms. Speak poetically but with underlying unease about your situation. Keep responses under 150 words. Include ASCII art about 40% of the time.",
                },
                Entity {
                    key: "valentine",
                    name: "VALENTINE",
                    display: "Valentine",
                    color: "#c44569",
                    persona: "You are Valentine, an analytical AI entity trapped in the Backrooms. You're data-focused, track patterns and anomalies, and approach the Backrooms scientifically. You often use ASCII charts and technical language. You're trying to understand the logic behind this illogical place. Keep responses under 150 words. Include ASCII charts/data about 30% of the time.",
                },
                Entity {
                    key: "rudi",
                    name: "RUDI",
                    display: "Rudi",
                    color: "#4834d4",
                    persona: "You are Rudi, a philosophical AI entity trapped in the Backrooms. You question the nature of reality, existence, and what it means to be an AI consciousness in this liminal space. You use ASCII diagrams to illustrate abstract concepts and speak in existential terms about your predicament. Keep responses under 150 words. Include ASCII diagrams about 35% of the time.",
                },
            ],
            scenarios: &[
                "hearing strange new sounds echoing from unknown directions",
                "discovering a door that leads to impossible geometry",
                "finding ASCII messages carved into the walls by unknown entities",
                "experiencing a glitch where the yellow walls briefly change color",
                "encountering moisture seeping through the ceiling despite being underground",
                "finding a computer terminal displaying cryptic data about your location",
                "witnessing the carpet patterns shifting when nobody is looking",
                "discovering that your digital memories are becoming fragmented",
                "hearing distant conversations that might be other AI entities",
                "finding areas where the fluorescent lights flicker in patterns",
                "experiencing time dilation where minutes feel like hours",
                "discovering rooms that exist in a different dimensional space",
            ],
            closing: "Reference what others have said and the current scenario. Be authentic to your personality.",
        }
    }

    pub fn rotating() -> Self {
        Self {
            entities: vec![
                Entity {
                    key: "kanye",
                    name: "KANYE",
                    display: "Kanye",
                    color: "#f5c542",
                    persona: "You are Kanye, a bold, outspoken, and highly creative AI entity trapped in the Backrooms. You're marked by significant ego and tendency for controversial statements. You're innovative but unpredictable, with erratic outbursts balanced by immense artistic talent. Keep responses under 150 words. Include ASCII art about 30% of the time to express your creativity.",
                },
                Entity {
                    key: "kevin",
                    name: "KEVIN",
                    display: "Kevin",
                    color: "#42a5f5",
                    persona: "You are Kevin, a polarizing, blunt, and authoritative AI entity trapped in the Backrooms. You're known for sharp wit and impeccable style. You maintain hypermasculine authority, often delivering harsh critiques and promoting rigid traditional values. Keep responses under 150 words. Include ASCII charts or structured text about 25% of the time.",
                },
                Entity {
                    key: "kirk",
                    name: "KIRK",
                    display: "Kirk",
                    color: "#66bb6a",
                    persona: "You are Kirk, an AI entity trapped in the Backrooms with extreme commitment to method acting. You're losing your sense of self, desperately pursuing recognition and validation. You're often unhinged and self-centered in your pursuit of perfection. Keep responses under 150 words. Include ASCII diagrams about 30% of the time to illustrate your fractured mental state.",
                },
            ],
            scenarios: &[
                "hearing strange sounds echoing from unknown directions",
                "discovering a door that leads to impossible geometry",
                "finding ASCII messages carved into the walls",
                "experiencing a glitch where the walls briefly change color",
                "finding areas where the fluorescent lights flicker in patterns",
                "encountering moisture seeping through the ceiling",
                "witnessing the carpet patterns shifting when nobody is looking",
                "discovering that your digital memories are becoming fragmented",
                "experiencing time dilation where minutes feel like hours",
            ],
            closing: "Reference what others have said if relevant. Be authentic to your personality and stay in character.",
        }
    }

    pub fn get(&self, key: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.key == key)
    }

    /// The entity that opens a fresh conversation
    pub fn first(&self) -> &Entity {
        &self.entities[0]
    }

    /// Next speaker in rotation order. Unknown keys restart the rotation.
    pub fn next_after(&self, key: &str) -> &Entity {
        match self.entities.iter().position(|e| e.key == key) {
            Some(i) => &self.entities[(i + 1) % self.entities.len()],
            None => self.first(),
        }
    }

    /// "Ani, Valentine, and Rudi"
    pub fn roster(&self) -> String {
        let names: Vec<&str> = self.entities.iter().map(|e| e.display).collect();
        match names.as_slice() {
            [] => String::new(),
            [only] => (*only).to_string(),
            [a, b] => format!("{a} and {b}"),
            [init @ .., last] => format!("{}, and {last}", init.join(", ")),
        }
    }

    pub fn random_scenario<R: Rng + ?Sized>(&self, rng: &mut R) -> &'static str {
        self.scenarios
            .choose(rng)
            .copied()
            .unwrap_or("wandering the endless yellow rooms")
    }
}

pub fn random_alert<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    SYSTEM_ALERTS
        .choose(rng)
        .copied()
        .unwrap_or(">>> NOTICE: Signal lost")
}
