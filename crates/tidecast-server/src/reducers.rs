//! Client-facing reducers. Each one is a thin adapter: read the caller's
//! rows through a [`PlayerLedger`], run the logic crate, log the result.

use std::sync::OnceLock;

use rand::rngs::StdRng;
use rand::SeedableRng;
use spacetimedb::{reducer, ReducerContext, Table};
use tidecast_logic::catalog::ZoneCatalog;
use tidecast_logic::error::FishingError;
use tidecast_logic::gear::GearSlot;
use tidecast_logic::protocol::{self, FishingRules};
use tidecast_logic::quests::starter_quests;
use tidecast_logic::store::BaitUse;
use tidecast_logic::world_clock::{world_state_with, WorldState};

use crate::ledger::{PlayerLedger, QuestBoard};
use crate::tables::*;

const STARTING_ZONE: &str = "Lake";
const STARTER_KIT: [(&str, u32); 3] = [("rod_bamboo", 1), ("hook_basic", 1), ("bait_worm", 10)];

// ============================================================================
// HELPERS
// ============================================================================

fn catalog() -> Result<&'static ZoneCatalog, String> {
    static CATALOG: OnceLock<Result<ZoneCatalog, String>> = OnceLock::new();
    CATALOG
        .get_or_init(|| ZoneCatalog::builtin().map_err(|e| e.to_string()))
        .as_ref()
        .map_err(Clone::clone)
}

fn rules() -> &'static FishingRules {
    static RULES: OnceLock<FishingRules> = OnceLock::new();
    RULES.get_or_init(FishingRules::default)
}

fn now_ms(ctx: &ReducerContext) -> i64 {
    ctx.timestamp.to_micros_since_unix_epoch() / 1000
}

/// Per-call random source: reducer timestamp mixed with the caller's identity.
fn reducer_rng(ctx: &ReducerContext) -> StdRng {
    let mut seed = ctx.timestamp.to_micros_since_unix_epoch() as u64;
    for chunk in ctx.sender.to_byte_array().chunks(8) {
        let mut word = [0u8; 8];
        word[..chunk.len()].copy_from_slice(chunk);
        seed = seed.rotate_left(17) ^ u64::from_le_bytes(word);
    }
    StdRng::seed_from_u64(seed)
}

fn clock_row(state: &WorldState, synced_ms: i64) -> WorldClock {
    WorldClock {
        id: 0,
        phase: state.phase.id(),
        cycle_number: state.cycle_number,
        cycle_minute: state.cycle_minute,
        is_raining: state.is_raining,
        rain_start_minute: state.rain_start_minute,
        synced_ms,
    }
}

// ============================================================================
// LIFECYCLE
// ============================================================================

#[reducer(init)]
pub fn init(ctx: &ReducerContext) {
    let now = now_ms(ctx);
    let state = world_state_with(&rules().clock, now);
    ctx.db.world_clock().insert(clock_row(&state, now));
    match catalog() {
        Ok(c) => log::info!(
            "Tidecast module ready: {} zones, {} catalog entries, {} gear items",
            c.zones.len(),
            c.entries.len(),
            c.gear.len()
        ),
        Err(e) => log::error!("Bundled catalog failed to load: {}", e),
    }
}

/// Called when a client connects
#[reducer(client_connected)]
pub fn client_connected(ctx: &ReducerContext) {
    log::info!("Client connected: {:?}", ctx.sender);
    if let Some(mut angler) = ctx.db.angler().identity().find(ctx.sender) {
        angler.online = true;
        ctx.db.angler().identity().update(angler);
    }
}

/// Called when a client disconnects
#[reducer(client_disconnected)]
pub fn client_disconnected(ctx: &ReducerContext) {
    log::info!("Client disconnected: {:?}", ctx.sender);
    if let Some(mut angler) = ctx.db.angler().identity().find(ctx.sender) {
        angler.online = false;
        ctx.db.angler().identity().update(angler);
    }
}

// ============================================================================
// ANGLER REDUCERS
// ============================================================================

/// Create the caller's angler with a starter kit and quest log
#[reducer]
pub fn register_angler(ctx: &ReducerContext, name: String) {
    if ctx.db.angler().identity().find(ctx.sender).is_some() {
        log::warn!("{:?} is already registered", ctx.sender);
        return;
    }
    let Ok(catalog) = catalog() else {
        log::error!("Cannot register {}: catalog unavailable", name);
        return;
    };
    log::info!("Registering angler {} ({:?})", name, ctx.sender);

    ctx.db.angler().insert(Angler {
        identity: ctx.sender,
        name,
        zone: STARTING_ZONE.to_string(),
        total_xp: 0,
        level: 1,
        session_counter: 0,
        online: true,
        created_at: ctx.timestamp,
    });

    let mut equipment = Equipment {
        owner: ctx.sender,
        rod: None,
        hook: None,
        bait: None,
    };
    for (item_id, quantity) in STARTER_KIT {
        let Some(gear) = catalog.gear_item(item_id) else {
            log::warn!("Starter item {} missing from catalog", item_id);
            continue;
        };
        ctx.db.inventory_item().insert(InventoryItem {
            id: 0,
            owner: ctx.sender,
            item_id: item_id.to_string(),
            kind: gear.slot.item_kind(),
            quantity,
        });
        let slot = Some(item_id.to_string());
        match gear.slot {
            GearSlot::Rod => equipment.rod = slot,
            GearSlot::Hook => equipment.hook = slot,
            GearSlot::Bait => equipment.bait = slot,
        }
    }
    ctx.db.equipment().insert(equipment);

    match starter_quests() {
        Ok(quests) => {
            for quest in quests {
                ctx.db.quest_objective().insert(QuestObjective {
                    id: 0,
                    owner: ctx.sender,
                    quest_id: quest.id,
                    description: quest.description,
                    species: quest.requirement.species,
                    kind: quest.requirement.kind.map(|k| k.id()),
                    min_rarity: quest.requirement.min_rarity.map(|r| r.id()),
                    zone: quest.requirement.zone,
                    requires_rain: quest.requirement.requires_rain,
                    requires_night: quest.requirement.requires_night,
                    required: quest.required,
                    progress: 0,
                    completed: false,
                });
            }
        }
        Err(e) => log::error!("Starter quests failed to load: {}", e),
    }
}

/// Move the caller to another fishing zone
#[reducer]
pub fn set_zone(ctx: &ReducerContext, zone: String) {
    let Some(mut angler) = ctx.db.angler().identity().find(ctx.sender) else {
        log::warn!("set_zone from unregistered {:?}", ctx.sender);
        return;
    };
    let Some(info) = catalog().ok().and_then(|c| c.zone(&zone)) else {
        log::warn!("Unknown zone {:?}", zone);
        return;
    };
    angler.zone = info.name.clone();
    log::info!("{} moved to {}", angler.name, angler.zone);
    ctx.db.angler().identity().update(angler);
}

/// Equip an owned gear item into its slot
#[reducer]
pub fn equip_item(ctx: &ReducerContext, item_id: String) {
    let Some(gear) = catalog().ok().and_then(|c| c.gear_item(&item_id)) else {
        log::warn!("Unknown gear item {}", item_id);
        return;
    };
    let owned = ctx
        .db
        .inventory_item()
        .iter()
        .any(|i| i.owner == ctx.sender && i.item_id == item_id && i.quantity > 0);
    if !owned {
        log::warn!("{:?} does not own {}", ctx.sender, item_id);
        return;
    }
    let mut equipment = ctx
        .db
        .equipment()
        .owner()
        .find(ctx.sender)
        .unwrap_or(Equipment {
            owner: ctx.sender,
            rod: None,
            hook: None,
            bait: None,
        });
    let slot = Some(item_id);
    match gear.slot {
        GearSlot::Rod => equipment.rod = slot,
        GearSlot::Hook => equipment.hook = slot,
        GearSlot::Bait => equipment.bait = slot,
    }
    if ctx.db.equipment().owner().find(ctx.sender).is_some() {
        ctx.db.equipment().owner().update(equipment);
    } else {
        ctx.db.equipment().insert(equipment);
    }
}

/// Add gear or bait to the caller's inventory
#[reducer]
pub fn grant_item(ctx: &ReducerContext, item_id: String, quantity: u32) {
    if quantity == 0 {
        return;
    }
    let Some(gear) = catalog().ok().and_then(|c| c.gear_item(&item_id)) else {
        log::warn!("Cannot grant unknown item {}", item_id);
        return;
    };
    let existing = ctx
        .db
        .inventory_item()
        .iter()
        .find(|i| i.owner == ctx.sender && i.item_id == item_id);
    match existing {
        Some(mut item) => {
            item.quantity = item.quantity.saturating_add(quantity);
            ctx.db.inventory_item().id().update(item);
        }
        None => {
            ctx.db.inventory_item().insert(InventoryItem {
                id: 0,
                owner: ctx.sender,
                item_id: item_id.clone(),
                kind: gear.slot.item_kind(),
                quantity,
            });
        }
    }
    log::info!("Granted {} x{} to {:?}", item_id, quantity, ctx.sender);
}

// ============================================================================
// WORLD
// ============================================================================

/// Recompute the world clock row from the reducer timestamp
#[reducer]
pub fn sync_world_clock(ctx: &ReducerContext) {
    let now = now_ms(ctx);
    let state = world_state_with(&rules().clock, now);
    let row = clock_row(&state, now);
    if ctx.db.world_clock().id().find(0).is_some() {
        ctx.db.world_clock().id().update(row);
    } else {
        ctx.db.world_clock().insert(row);
    }
}

// ============================================================================
// FISHING
// ============================================================================

/// Cast: roll a catch and open (or replace) the caller's fishing session.
/// The client reads bite delay, version and candidate from `fishing_session`.
#[reducer]
pub fn start_fishing(ctx: &ReducerContext) -> Result<(), String> {
    let catalog = catalog()?;
    let mut ledger = PlayerLedger::new(ctx);
    let mut rng = reducer_rng(ctx);
    match protocol::start(&mut ledger, catalog, rules(), now_ms(ctx), &mut rng) {
        Ok(reply) => {
            log::info!(
                "{:?} cast v{}: {} ({}) bites in {}ms",
                ctx.sender,
                reply.version,
                reply.candidate.species,
                reply.candidate.rarity.name(),
                reply.bite_delay_ms
            );
            Ok(())
        }
        Err(err) => {
            log::warn!("start_fishing rejected for {:?}: {}", ctx.sender, err);
            Err(err.to_string())
        }
    }
}

/// Claim the catch for session `version`. Rejections that discard the
/// session commit and report through `catch_outcome`; the rest fail the call.
#[reducer]
pub fn catch_fish(ctx: &ReducerContext, version: u64) -> Result<(), String> {
    let catalog = catalog()?;
    let mut ledger = PlayerLedger::new(ctx);
    let mut quests = QuestBoard {
        ctx,
        owner: ctx.sender,
    };
    let mut outcome = CatchOutcome {
        owner: ctx.sender,
        version,
        caught: false,
        error: None,
        species: None,
        rarity: None,
        weight: None,
        xp_gained: 0,
        levels_gained: 0,
        new_biggest: false,
        decided_at: ctx.timestamp,
    };

    match protocol::catch(&mut ledger, catalog, &mut quests, rules(), now_ms(ctx), version) {
        Ok(reply) => {
            log::info!(
                "{:?} caught {} ({}) +{}xp, level {}{}",
                ctx.sender,
                reply.item.species,
                reply.item.rarity.name(),
                reply.award.xp_gained,
                reply.award.progress.level,
                if reply.award.levels_gained > 0 { " (level up)" } else { "" }
            );
            if reply.bait == BaitUse::Exhausted {
                log::info!("{:?} ran out of bait", ctx.sender);
            }
            outcome.caught = true;
            outcome.species = Some(reply.item.species);
            outcome.rarity = Some(reply.item.rarity.id());
            outcome.weight = reply.item.weight;
            outcome.xp_gained = reply.award.xp_gained;
            outcome.levels_gained = reply.award.levels_gained;
            outcome.new_biggest = reply.record.new_biggest;
        }
        Err(
            err @ (FishingError::WindowExpired | FishingError::TooEarly | FishingError::Corrupt(_)),
        ) => {
            log::warn!("catch_fish v{} discarded for {:?}: {}", version, ctx.sender, err);
            outcome.error = Some(err.to_string());
        }
        Err(err) => {
            log::warn!("catch_fish v{} rejected for {:?}: {}", version, ctx.sender, err);
            return Err(err.to_string());
        }
    }

    if ctx.db.catch_outcome().owner().find(ctx.sender).is_some() {
        ctx.db.catch_outcome().owner().update(outcome);
    } else {
        ctx.db.catch_outcome().insert(outcome);
    }
    Ok(())
}
