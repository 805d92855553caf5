//! Persistence seams for the fishing protocol.
//!
//! [`FishingStore`] is one angler's view of the relational store: their
//! profile, equipment, bait, catch log and at most one fishing session.
//! The SpacetimeDB module implements it over tables; [`MemoryStore`] backs
//! tests and the headless harness.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::Rarity;
use crate::error::FishingError;
use crate::gear::EquippedGear;
use crate::generator::{CatchCandidate, Modifier};
use crate::progression::Progress;
use crate::session::FishingSession;
use crate::world_clock::WorldState;

/// Profile fields the protocol reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnglerState {
    pub zone: String,
    pub progress: Progress,
}

/// What happened to the equipped bait on a catch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BaitUse {
    Consumed { remaining: u32 },
    /// The last unit went; the bait slot is now empty.
    Exhausted,
    NoneEquipped,
}

/// Outcome of writing a catch to the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatchRecord {
    /// Count in the species/rarity/modifier stack after this catch.
    pub stack_count: u32,
    /// The catch replaced the species' biggest-ever record.
    pub new_biggest: bool,
}

pub trait FishingStore {
    fn angler(&self) -> Result<AnglerState, FishingError>;
    fn equipped_gear(&self) -> EquippedGear;

    fn load_session(&self) -> Result<Option<FishingSession>, FishingError>;
    /// Replace any existing session.
    fn save_session(&mut self, session: &FishingSession) -> Result<(), FishingError>;
    fn delete_session(&mut self);
    /// Bump and return the angler's session counter.
    fn next_session_version(&mut self) -> u64;

    fn consume_bait(&mut self) -> BaitUse;
    fn record_catch(&mut self, item: &CatchCandidate, now_ms: i64) -> CatchRecord;
    fn save_progress(&mut self, progress: Progress);
}

/// A completed catch, as quest evaluation sees it.
#[derive(Debug, Clone, Copy)]
pub struct CatchEvent<'a> {
    pub zone: &'a str,
    pub item: &'a CatchCandidate,
    pub world: &'a WorldState,
}

pub trait QuestHook {
    /// Returns how many objectives advanced.
    fn on_catch(&mut self, event: &CatchEvent<'_>) -> u32;
}

/// Quest hook for deployments without quests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoQuests;

impl QuestHook for NoQuests {
    fn on_catch(&mut self, _event: &CatchEvent<'_>) -> u32 {
        0
    }
}

/// Key of one catch stack: species, rarity, modifier id.
pub type StackKey = (String, Rarity, u8);

/// Single-angler store held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub angler: Option<AnglerState>,
    pub equipped: EquippedGear,
    pub bait_count: u32,
    pub session: Option<FishingSession>,
    pub session_counter: u64,
    pub stacks: BTreeMap<StackKey, u32>,
    /// Heaviest weight per species.
    pub biggest: BTreeMap<String, f32>,
}

impl MemoryStore {
    /// A registered level-1 angler fishing in `zone`.
    pub fn new(zone: &str) -> Self {
        Self {
            angler: Some(AnglerState {
                zone: zone.to_string(),
                progress: Progress::default(),
            }),
            ..Self::default()
        }
    }

    pub fn with_gear(mut self, equipped: EquippedGear, bait_count: u32) -> Self {
        self.equipped = equipped;
        self.bait_count = if self.equipped.bait.is_some() {
            bait_count
        } else {
            0
        };
        self
    }

    pub fn total_caught(&self) -> u32 {
        self.stacks.values().sum()
    }
}

impl FishingStore for MemoryStore {
    fn angler(&self) -> Result<AnglerState, FishingError> {
        self.angler.clone().ok_or(FishingError::UnknownAngler)
    }

    fn equipped_gear(&self) -> EquippedGear {
        self.equipped.clone()
    }

    fn load_session(&self) -> Result<Option<FishingSession>, FishingError> {
        Ok(self.session.clone())
    }

    fn save_session(&mut self, session: &FishingSession) -> Result<(), FishingError> {
        self.session = Some(session.clone());
        Ok(())
    }

    fn delete_session(&mut self) {
        self.session = None;
    }

    fn next_session_version(&mut self) -> u64 {
        self.session_counter += 1;
        self.session_counter
    }

    fn consume_bait(&mut self) -> BaitUse {
        if self.equipped.bait.is_none() {
            return BaitUse::NoneEquipped;
        }
        if self.bait_count > 1 {
            self.bait_count -= 1;
            BaitUse::Consumed {
                remaining: self.bait_count,
            }
        } else {
            self.bait_count = 0;
            self.equipped.bait = None;
            BaitUse::Exhausted
        }
    }

    fn record_catch(&mut self, item: &CatchCandidate, _now_ms: i64) -> CatchRecord {
        let key = (item.species.clone(), item.rarity, Modifier::id_of(item.modifier));
        let count = self.stacks.entry(key).or_insert(0);
        *count += 1;
        let stack_count = *count;

        let new_biggest = match item.weight {
            Some(weight) => {
                let best = self.biggest.entry(item.species.clone()).or_insert(0.0);
                if weight > *best {
                    *best = weight;
                    true
                } else {
                    false
                }
            }
            None => false,
        };
        CatchRecord {
            stack_count,
            new_biggest,
        }
    }

    fn save_progress(&mut self, progress: Progress) {
        if let Some(angler) = self.angler.as_mut() {
            angler.progress = progress;
        }
    }
}
