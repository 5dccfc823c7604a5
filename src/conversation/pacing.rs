//! When the next entity turn may be taken

use rand::Rng;
use std::time::Duration;

/// Turn spacing for a room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pacing {
    /// Wait before the first turn of a fresh conversation
    pub initial_delay: Duration,
    pub min_gap: Duration,
    pub max_gap: Duration,
}

impl Pacing {
    /// Randomized gap between turns, for rooms meant to feel unhurried
    pub fn scheduled() -> Self {
        Self {
            initial_delay: Duration::from_secs(30),
            min_gap: Duration::from_secs(30),
            max_gap: Duration::from_secs(120),
        }
    }

    /// Fixed cooldown; the first turn may be taken immediately
    pub fn cooldown() -> Self {
        Self {
            initial_delay: Duration::ZERO,
            min_gap: Duration::from_secs(10),
            max_gap: Duration::from_secs(10),
        }
    }

    /// Gap before the turn after this one, uniform in `[min_gap, max_gap]`
    pub fn sample_gap<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.max_gap <= self.min_gap {
            return self.min_gap;
        }
        rng.gen_range(self.min_gap..=self.max_gap)
    }
}

/// Whether a room may take an entity turn right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Due,
    /// Another generation holds the in-flight flag
    InFlight,
    NotDue { wait_ms: i64 },
}

impl Readiness {
    pub fn is_due(self) -> bool {
        matches!(self, Readiness::Due)
    }
}

pub(crate) fn millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}
