//! Catch generator — turns a zone, the weather and the player's luck into a
//! concrete [`CatchCandidate`].
//!
//! Steps, in order:
//! 1. Category roll: fish or resource.
//! 2. Zone filter over the catalog (an empty zone is a configuration error).
//! 3. Rarity roll over weather- and luck-adjusted tier weights.
//! 4. Uniform pick among the zone's entries of that rarity (falls back to the
//!    common tier).
//! 5. Instance attributes for fish: weight, length, massive flag, modifier.
//! 6. The angler's gear stats are attached for the simulation that follows.
//!
//! All randomness comes from the injected `rng`, so a seeded generator
//! reproduces the same catch.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::{BarType, CatalogEntry, CatchKind, Rarity, ZoneCatalog};
use crate::constants::modifier_ids;
use crate::gear::GearStats;
use crate::world_clock::{DayPhase, Weather};

/// Order in which the cumulative distribution is walked: rarest first.
pub const RARITY_ROLL_ORDER: [Rarity; 6] = [
    Rarity::Mythic,
    Rarity::Legendary,
    Rarity::Epic,
    Rarity::Rare,
    Rarity::Uncommon,
    Rarity::Common,
];

/// Base tier weights and the adjustments applied to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RarityTable {
    /// Base weight per tier, indexed by [`Rarity::index`].
    pub base: [f64; 6],
    /// Multiplier applied to every non-common tier while it rains.
    pub rain_multiplier: f64,
    /// Per-point luck boost for rare and above.
    pub luck_factor: f64,
}

impl Default for RarityTable {
    fn default() -> Self {
        Self {
            base: [0.639, 0.20, 0.10, 0.05, 0.01, 0.001],
            rain_multiplier: 1.25,
            luck_factor: 0.01,
        }
    }
}

/// Cosmetic or stat-altering trait rolled on a small share of fish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Modifier {
    Albino,
    Buff,
    Elusive,
    Golden,
    Glowing,
}

impl Modifier {
    pub fn id(self) -> u8 {
        match self {
            Modifier::Albino => modifier_ids::ALBINO,
            Modifier::Buff => modifier_ids::BUFF,
            Modifier::Elusive => modifier_ids::ELUSIVE,
            Modifier::Golden => modifier_ids::GOLDEN,
            Modifier::Glowing => modifier_ids::GLOWING,
        }
    }

    /// Stack id for an optional modifier (`NONE` when absent).
    pub fn id_of(modifier: Option<Modifier>) -> u8 {
        modifier.map_or(modifier_ids::NONE, Modifier::id)
    }
}

/// Generator tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub rarity: RarityTable,
    /// Chance the cast brings up a resource instead of a fish.
    pub resource_chance: f64,
    /// Chance a fish carries a modifier.
    pub modifier_chance: f64,
    /// Weighted modifier table.
    pub modifiers: Vec<(Modifier, u32)>,
    pub buff_stamina_scale: f32,
    pub elusive_tug_scale: f32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            rarity: RarityTable::default(),
            resource_chance: 0.2,
            modifier_chance: 0.01,
            modifiers: vec![
                (Modifier::Albino, 25),
                (Modifier::Buff, 30),
                (Modifier::Elusive, 30),
                (Modifier::Golden, 5),
                (Modifier::Glowing, 10),
            ],
            buff_stamina_scale: 1.3,
            elusive_tug_scale: 1.2,
        }
    }
}

/// Where and when the line goes in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatchConditions<'a> {
    pub zone: &'a str,
    pub weather: Weather,
    pub phase: DayPhase,
}

/// The generated outcome of one cast. Immutable once generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchCandidate {
    pub kind: CatchKind,
    pub species: String,
    pub rarity: Rarity,
    pub stamina: f32,
    pub tug_strength: f32,
    pub change_rate: f32,
    pub change_strength: f32,
    pub bar_type: BarType,
    pub sell_price: u32,
    #[serde(default)]
    pub weight: Option<f32>,
    #[serde(default)]
    pub length: Option<f32>,
    #[serde(default)]
    pub modifier: Option<Modifier>,
    #[serde(default)]
    pub is_massive: bool,
    /// Stats of the gear equipped at cast time, for the client simulation.
    pub gear: GearStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("zone {0:?} has no catalog entries")]
    EmptyZone(String),
}

/// Normalize weights in place so they sum to 1.
fn normalize(weights: &mut [f64; 6]) {
    let total: f64 = weights.iter().sum();
    if total > 0.0 {
        for w in weights.iter_mut() {
            *w /= total;
        }
    }
}

/// Base weights after the weather adjustment, normalized.
pub fn weather_adjusted(table: &RarityTable, weather: Weather) -> [f64; 6] {
    let mut weights = table.base;
    if weather == Weather::Rain {
        for rarity in Rarity::ALL {
            if rarity != Rarity::Common {
                weights[rarity.index()] *= table.rain_multiplier;
            }
        }
    }
    normalize(&mut weights);
    weights
}

/// Apply the luck boost to already-normalized weights, renormalizing.
/// Negative luck is treated as zero.
pub fn luck_adjusted(table: &RarityTable, weights: [f64; 6], luck: f32) -> [f64; 6] {
    let boost = 1.0 + luck.max(0.0) as f64 * table.luck_factor;
    let mut weights = weights;
    for rarity in Rarity::ALL {
        if rarity.is_luck_boosted() {
            weights[rarity.index()] *= boost;
        }
    }
    normalize(&mut weights);
    weights
}

/// Final tier distribution for the given weather and luck.
pub fn rarity_weights(table: &RarityTable, weather: Weather, luck: f32) -> [f64; 6] {
    luck_adjusted(table, weather_adjusted(table, weather), luck)
}

/// Walk the cumulative distribution in [`RARITY_ROLL_ORDER`] for `roll` in `[0, 1)`.
pub fn pick_rarity(weights: &[f64; 6], roll: f64) -> Rarity {
    let mut cumulative = 0.0;
    for rarity in RARITY_ROLL_ORDER {
        cumulative += weights[rarity.index()];
        if roll < cumulative {
            return rarity;
        }
    }
    Rarity::Common
}

fn pick_modifier<R: Rng + ?Sized>(table: &[(Modifier, u32)], rng: &mut R) -> Option<Modifier> {
    let total: u32 = table.iter().map(|(_, w)| w).sum();
    if total == 0 {
        return None;
    }
    let mut roll = rng.gen_range(0..total);
    for (modifier, weight) in table {
        if roll < *weight {
            return Some(*modifier);
        }
        roll -= weight;
    }
    None
}

/// Weight at or above which a fish counts as massive (top 5% of the range).
pub fn massive_threshold(base_weight: f32) -> f32 {
    let max = base_weight * 1.5;
    let min = base_weight * 0.5;
    max - 0.05 * (max - min)
}

fn round_to(value: f32, decimals: i32) -> f32 {
    let factor = 10f32.powi(decimals);
    (value * factor).round() / factor
}

/// Generate one catch for the given conditions.
pub fn generate<R: Rng + ?Sized>(
    catalog: &ZoneCatalog,
    conditions: &CatchConditions<'_>,
    gear: GearStats,
    config: &GeneratorConfig,
    rng: &mut R,
) -> Result<CatchCandidate, GenerateError> {
    // 1. Category roll
    let rolled_kind = if rng.gen::<f64>() < config.resource_chance {
        CatchKind::Resource
    } else {
        CatchKind::Fish
    };

    // 2. Zone filter
    let zone_pool = catalog.zone_entries(conditions.zone);
    if zone_pool.is_empty() {
        return Err(GenerateError::EmptyZone(conditions.zone.to_string()));
    }
    let mut pool: Vec<&CatalogEntry> = zone_pool
        .iter()
        .copied()
        .filter(|e| e.kind == rolled_kind)
        .collect();
    if pool.is_empty() {
        pool = zone_pool.clone();
    }
    let admitted: Vec<&CatalogEntry> = pool
        .iter()
        .copied()
        .filter(|e| e.allows(conditions.phase, conditions.weather))
        .collect();
    if !admitted.is_empty() {
        pool = admitted;
    }

    // 3. Rarity
    let weights = rarity_weights(&config.rarity, conditions.weather, gear.luck);
    let rarity = pick_rarity(&weights, rng.gen::<f64>());

    // 4. Entry
    let mut tier: Vec<&CatalogEntry> = pool.iter().copied().filter(|e| e.rarity == rarity).collect();
    if tier.is_empty() {
        tier = pool.iter().copied().filter(|e| e.rarity == Rarity::Common).collect();
    }
    if tier.is_empty() {
        tier = pool;
    }
    let entry = tier[rng.gen_range(0..tier.len())];

    let mut candidate = CatchCandidate {
        kind: entry.kind,
        species: entry.name.clone(),
        rarity: entry.rarity,
        stamina: entry.stamina,
        tug_strength: entry.tug_strength,
        change_rate: entry.change_rate,
        change_strength: entry.change_strength,
        bar_type: entry.bar_type,
        sell_price: entry.sell_price,
        weight: None,
        length: None,
        modifier: None,
        is_massive: false,
        gear,
    };

    // 5. Instance attributes
    if entry.kind == CatchKind::Fish {
        let weight = entry.base_weight * (0.5 + rng.gen::<f32>());
        candidate.is_massive = weight >= massive_threshold(entry.base_weight);
        candidate.length = Some(round_to(
            entry.base_length * (weight / entry.base_weight),
            1,
        ));
        candidate.weight = Some(round_to(weight, 2));

        if rng.gen::<f64>() < config.modifier_chance {
            candidate.modifier = pick_modifier(&config.modifiers, rng);
            match candidate.modifier {
                Some(Modifier::Buff) => candidate.stamina *= config.buff_stamina_scale,
                Some(Modifier::Elusive) => candidate.tug_strength *= config.elusive_tug_scale,
                _ => {}
            }
        }
    }

    Ok(candidate)
}
