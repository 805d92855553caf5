//! Catch-driven quest objectives.
//!
//! An objective counts catches that satisfy every requirement it sets.
//! Unset requirements match anything.

use serde::{Deserialize, Serialize};

use crate::catalog::{CatchKind, Rarity};
use crate::store::CatchEvent;
use crate::world_clock::DayPhase;

const STARTER_QUESTS_JSON: &str = include_str!("../../../data/quests.json");

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestRequirement {
    #[serde(default)]
    pub species: Option<String>,
    #[serde(default)]
    pub kind: Option<CatchKind>,
    /// Matches this tier and anything rarer.
    #[serde(default)]
    pub min_rarity: Option<Rarity>,
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default)]
    pub requires_rain: bool,
    #[serde(default)]
    pub requires_night: bool,
}

impl QuestRequirement {
    pub fn matches(&self, event: &CatchEvent<'_>) -> bool {
        let item = event.item;
        self.species.as_deref().map_or(true, |s| s == item.species)
            && self.kind.map_or(true, |k| k == item.kind)
            && self.min_rarity.map_or(true, |r| item.rarity >= r)
            && self
                .zone
                .as_deref()
                .map_or(true, |z| z.eq_ignore_ascii_case(event.zone))
            && (!self.requires_rain || event.world.is_raining)
            && (!self.requires_night || event.world.phase == DayPhase::Night)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestTemplate {
    pub id: String,
    pub description: String,
    #[serde(flatten)]
    pub requirement: QuestRequirement,
    pub required: u32,
}

/// Objectives every new angler starts with.
pub fn starter_quests() -> Result<Vec<QuestTemplate>, serde_json::Error> {
    serde_json::from_str(STARTER_QUESTS_JSON)
}

/// Progress after one matching catch, capped at `required`.
/// Returns the new count and whether the objective is now complete.
pub fn advance(progress: u32, required: u32) -> (u32, bool) {
    let next = progress.saturating_add(1).min(required.max(1));
    (next, next >= required)
}
