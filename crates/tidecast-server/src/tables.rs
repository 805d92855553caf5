//! SpacetimeDB table definitions for the fishing game.
//!
//! Everything an angler owns is keyed by their `Identity`. Enum-like fields
//! are stored as the u8 ids from `tidecast_logic::constants`.

use spacetimedb::{table, Identity, Timestamp};

// ============================================================================
// ANGLERS
// ============================================================================

/// Registered player profile
#[table(name = angler, public)]
#[derive(Clone)]
pub struct Angler {
    #[primary_key]
    pub identity: Identity,
    pub name: String,
    pub zone: String,
    pub total_xp: u64,
    pub level: u32,
    /// Last session version handed out by `start_fishing`.
    pub session_counter: u64,
    pub online: bool,
    pub created_at: Timestamp,
}

/// Gear currently in use, by catalog gear id
#[table(name = equipment, public)]
#[derive(Clone)]
pub struct Equipment {
    #[primary_key]
    pub owner: Identity,
    pub rod: Option<String>,
    pub hook: Option<String>,
    pub bait: Option<String>,
}

/// Owned gear and consumables
#[table(name = inventory_item, public)]
#[derive(Clone)]
pub struct InventoryItem {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    pub owner: Identity,
    pub item_id: String,
    pub kind: u8,         // item_kinds
    pub quantity: u32,
}

// ============================================================================
// FISHING
// ============================================================================

/// The single in-flight attempt per angler. Overwritten by every start.
#[table(name = fishing_session, public)]
#[derive(Clone)]
pub struct FishingSessionRow {
    #[primary_key]
    pub owner: Identity,
    pub version: u64,
    /// JSON-encoded `CatchCandidate`
    pub candidate_json: String,
    pub species: String,
    pub rarity: u8,       // rarity_ids
    pub started_ms: i64,
    pub bite_delay_ms: i64,
    pub bite_time_ms: i64,
}

/// Result of the latest `catch_fish` call, for the client to read back
#[table(name = catch_outcome, public)]
#[derive(Clone)]
pub struct CatchOutcome {
    #[primary_key]
    pub owner: Identity,
    pub version: u64,
    pub caught: bool,
    pub error: Option<String>,
    pub species: Option<String>,
    pub rarity: Option<u8>,
    pub weight: Option<f32>,
    pub xp_gained: u64,
    pub levels_gained: u32,
    pub new_biggest: bool,
    pub decided_at: Timestamp,
}

/// Caught items, stacked by species, rarity and modifier
#[table(name = catch_stack, public)]
#[derive(Clone)]
pub struct CatchStack {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    pub owner: Identity,
    pub species: String,
    pub kind: u8,         // item_kinds::FISH / RESOURCE
    pub rarity: u8,
    pub modifier: u8,     // modifier_ids
    pub count: u32,
    pub last_caught_ms: i64,
}

/// All-time heaviest catch of each species
#[table(name = biggest_catch, public)]
#[derive(Clone)]
pub struct BiggestCatch {
    #[primary_key]
    pub species: String,
    pub holder: Identity,
    pub weight: f32,
    pub length: f32,
    pub caught_ms: i64,
}

// ============================================================================
// QUESTS
// ============================================================================

/// One objective on an angler's quest log
#[table(name = quest_objective, public)]
#[derive(Clone)]
pub struct QuestObjective {
    #[primary_key]
    #[auto_inc]
    pub id: u64,
    pub owner: Identity,
    pub quest_id: String,
    pub description: String,
    pub species: Option<String>,
    pub kind: Option<u8>,
    pub min_rarity: Option<u8>,
    pub zone: Option<String>,
    pub requires_rain: bool,
    pub requires_night: bool,
    pub required: u32,
    pub progress: u32,
    pub completed: bool,
}

// ============================================================================
// WORLD
// ============================================================================

/// World clock singleton (id always 0), refreshed by `sync_world_clock`
#[table(name = world_clock, public)]
#[derive(Clone)]
pub struct WorldClock {
    #[primary_key]
    pub id: u32,
    pub phase: u8,        // day_phases
    pub cycle_number: i64,
    pub cycle_minute: f64,
    pub is_raining: bool,
    pub rain_start_minute: Option<u32>,
    pub synced_ms: i64,
}
