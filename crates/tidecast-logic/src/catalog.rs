//! Zone catalog — immutable reference data for fish, resources, zones and gear.
//!
//! The catalog ships as JSON (`data/catalog.json`) embedded at compile time.
//! Both the SpacetimeDB module and the native harness load the same file.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{item_kinds, rarity_ids};
use crate::gear::{EquippedGear, GearItem, GearStats};
use crate::world_clock::{DayPhase, Weather};

const BUILTIN_CATALOG_JSON: &str = include_str!("../../../data/catalog.json");

/// Rarity tier, ordered from most to least common.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
    Mythic,
}

impl Rarity {
    /// All tiers, common first.
    pub const ALL: [Rarity; 6] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
        Rarity::Mythic,
    ];

    pub fn id(self) -> u8 {
        match self {
            Rarity::Common => rarity_ids::COMMON,
            Rarity::Uncommon => rarity_ids::UNCOMMON,
            Rarity::Rare => rarity_ids::RARE,
            Rarity::Epic => rarity_ids::EPIC,
            Rarity::Legendary => rarity_ids::LEGENDARY,
            Rarity::Mythic => rarity_ids::MYTHIC,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Rarity::ALL.into_iter().find(|r| r.id() == id)
    }

    /// Index into per-tier arrays (same order as [`Rarity::ALL`]).
    pub fn index(self) -> usize {
        self.id() as usize
    }

    /// Tiers that luck boosts.
    pub fn is_luck_boosted(self) -> bool {
        matches!(
            self,
            Rarity::Rare | Rarity::Epic | Rarity::Legendary | Rarity::Mythic
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
            Rarity::Mythic => "mythic",
        }
    }
}

/// Whether a catalog entry is a fish or a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatchKind {
    Fish,
    Resource,
}

impl CatchKind {
    pub fn id(self) -> u8 {
        match self {
            CatchKind::Fish => item_kinds::FISH,
            CatchKind::Resource => item_kinds::RESOURCE,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        [CatchKind::Fish, CatchKind::Resource]
            .into_iter()
            .find(|k| k.id() == id)
    }

    pub fn other(self) -> Self {
        match self {
            CatchKind::Fish => CatchKind::Resource,
            CatchKind::Resource => CatchKind::Fish,
        }
    }
}

/// Colour-zone layout of the balance bar for one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BarType {
    Middle,
    MiddleSmall,
    Low,
    High,
    Double,
    DynamicSmall,
    DynamicMedium,
    DynamicLarge,
}

impl BarType {
    pub fn is_dynamic(self) -> bool {
        matches!(
            self,
            BarType::DynamicSmall | BarType::DynamicMedium | BarType::DynamicLarge
        )
    }
}

/// One species or resource and where it can be caught.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub kind: CatchKind,
    pub zones: Vec<String>,
    pub rarity: Rarity,
    /// Fish only; resources have no size.
    #[serde(default)]
    pub base_weight: f32,
    #[serde(default)]
    pub base_length: f32,
    pub stamina: f32,
    pub tug_strength: f32,
    /// How often the fish changes direction (higher = more often).
    pub change_rate: f32,
    /// Percent of full pull the fish applies (0–100).
    pub change_strength: f32,
    pub sell_price: u32,
    pub bar_type: BarType,
    #[serde(default)]
    pub time_of_day: Option<DayPhase>,
    #[serde(default)]
    pub weather: Option<Weather>,
}

impl CatalogEntry {
    /// Zone membership, case-insensitive.
    pub fn in_zone(&self, zone: &str) -> bool {
        self.zones.iter().any(|z| z.eq_ignore_ascii_case(zone))
    }

    /// Whether the entry's optional time/weather restriction admits these conditions.
    pub fn allows(&self, phase: DayPhase, weather: Weather) -> bool {
        self.time_of_day.map_or(true, |p| p == phase) && self.weather.map_or(true, |w| w == weather)
    }
}

/// Per-zone settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneInfo {
    pub name: String,
    #[serde(default = "ZoneInfo::default_xp_multiplier")]
    pub xp_multiplier: f32,
}

impl ZoneInfo {
    fn default_xp_multiplier() -> f32 {
        1.0
    }
}

/// Errors raised while loading or validating catalog data.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog JSON is malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("catalog entry {name:?}: {reason}")]
    InvalidEntry { name: String, reason: &'static str },
    #[error("duplicate gear id {0:?}")]
    DuplicateGear(String),
}

/// The full reference catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ZoneCatalog {
    pub zones: Vec<ZoneInfo>,
    pub entries: Vec<CatalogEntry>,
    #[serde(default)]
    pub gear: Vec<GearItem>,
}

impl ZoneCatalog {
    /// Parse and validate a catalog document.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: ZoneCatalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// The catalog bundled with the crate.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG_JSON)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        for entry in &self.entries {
            let invalid = |reason| CatalogError::InvalidEntry {
                name: entry.name.clone(),
                reason,
            };
            if entry.zones.is_empty() {
                return Err(invalid("no zones"));
            }
            if entry.stamina <= 0.0 {
                return Err(invalid("stamina must be positive"));
            }
            if entry.tug_strength <= 0.0 {
                return Err(invalid("tug_strength must be positive"));
            }
            if entry.change_rate <= 0.0 {
                return Err(invalid("change_rate must be positive"));
            }
            if !(0.0..=100.0).contains(&entry.change_strength) {
                return Err(invalid("change_strength must be within 0..=100"));
            }
            if entry.kind == CatchKind::Fish && (entry.base_weight <= 0.0 || entry.base_length <= 0.0) {
                return Err(invalid("fish need a positive base weight and length"));
            }
        }
        for (i, item) in self.gear.iter().enumerate() {
            if self.gear[..i].iter().any(|g| g.id == item.id) {
                return Err(CatalogError::DuplicateGear(item.id.clone()));
            }
        }
        Ok(())
    }

    /// Every entry catchable in `zone` (case-insensitive).
    pub fn zone_entries(&self, zone: &str) -> Vec<&CatalogEntry> {
        self.entries.iter().filter(|e| e.in_zone(zone)).collect()
    }

    pub fn entry(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn zone(&self, name: &str) -> Option<&ZoneInfo> {
        self.zones.iter().find(|z| z.name.eq_ignore_ascii_case(name))
    }

    /// XP multiplier for a zone; unknown zones count as 1.0.
    pub fn xp_multiplier(&self, zone: &str) -> f32 {
        self.zone(zone).map_or(1.0, |z| z.xp_multiplier)
    }

    pub fn gear_item(&self, id: &str) -> Option<&GearItem> {
        self.gear.iter().find(|g| g.id == id)
    }

    /// Stats contributed by the given equipment.
    pub fn gear_stats(&self, equipped: &EquippedGear) -> GearStats {
        GearStats::from_equipped(equipped, |id| self.gear_item(id))
    }
}
