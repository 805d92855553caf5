//! The persisted fishing session and its timing rules.
//!
//! A session is written on `start` and consumed on `catch`. Everything about
//! it is decided by timestamp comparison; there are no server-side timers.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::generator::CatchCandidate;

/// Protocol timing. All values in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub bite_delay_min_ms: i64,
    pub bite_delay_max_ms: i64,
    /// How long the player has to react once the fish bites.
    pub reaction_window_ms: i64,
    /// Reactions faster than this earn the bonus.
    pub quick_reaction_ms: i64,
    pub quick_reaction_bonus: u32,
    /// `catch` is accepted until `bite_time + catch_window_ms`.
    pub catch_window_ms: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            bite_delay_min_ms: 4000,
            bite_delay_max_ms: 8000,
            reaction_window_ms: 4000,
            quick_reaction_ms: 1500,
            quick_reaction_bonus: 10,
            catch_window_ms: 60_000,
        }
    }
}

impl SessionConfig {
    pub fn roll_bite_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> i64 {
        let max = self.bite_delay_max_ms.max(self.bite_delay_min_ms);
        rng.gen_range(self.bite_delay_min_ms..=max)
    }

    /// Stamina bonus for reacting `reaction_ms` after the bite, or `None`
    /// when the reaction window has closed.
    pub fn reaction_bonus(&self, reaction_ms: i64) -> Option<u32> {
        if !(0..=self.reaction_window_ms).contains(&reaction_ms) {
            return None;
        }
        Some(if reaction_ms <= self.quick_reaction_ms {
            self.quick_reaction_bonus
        } else {
            0
        })
    }
}

/// Where a `catch` call lands relative to the session's bite time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatchTiming {
    TooEarly,
    InWindow,
    Expired,
}

/// One angler's in-flight attempt. At most one exists per angler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FishingSession {
    /// Monotonic per-angler counter; `catch` must quote it back.
    pub version: u64,
    pub candidate: CatchCandidate,
    pub started_ms: i64,
    pub bite_delay_ms: i64,
    pub bite_time_ms: i64,
}

impl FishingSession {
    pub fn new(version: u64, candidate: CatchCandidate, now_ms: i64, bite_delay_ms: i64) -> Self {
        Self {
            version,
            candidate,
            started_ms: now_ms,
            bite_delay_ms,
            bite_time_ms: now_ms + bite_delay_ms,
        }
    }

    pub fn catch_timing(&self, config: &SessionConfig, now_ms: i64) -> CatchTiming {
        if now_ms < self.bite_time_ms {
            CatchTiming::TooEarly
        } else if now_ms > self.bite_time_ms + config.catch_window_ms {
            CatchTiming::Expired
        } else {
            CatchTiming::InWindow
        }
    }
}

/// Encode a candidate for a text column.
pub fn encode_candidate(candidate: &CatchCandidate) -> Result<String, serde_json::Error> {
    serde_json::to_string(candidate)
}

pub fn decode_candidate(json: &str) -> Result<CatchCandidate, serde_json::Error> {
    serde_json::from_str(json)
}
