//! End-to-end tests for the fishing loop.
//!
//! Exercises: ClientSession → start → bite/reaction timers → TugSimulation
//! → catch → bait, catch log, XP and quest hook
//!
//! All tests run against the in-memory store — no SpacetimeDB.

use rand::rngs::StdRng;
use rand::SeedableRng;

use tidecast_logic::catalog::{CatchKind, Rarity, ZoneCatalog};
use tidecast_logic::client::{ClientConfig, ClientPhase, ClientSession};
use tidecast_logic::error::{ErrorKind, FishingError};
use tidecast_logic::gear::{EquippedGear, GearStats};
use tidecast_logic::generator::{generate, CatchConditions, GeneratorConfig};
use tidecast_logic::progression::{rarity_xp, total_xp_to_level};
use tidecast_logic::protocol::{catch, start, FishingRules};
use tidecast_logic::store::{BaitUse, CatchEvent, MemoryStore, NoQuests, QuestHook};
use tidecast_logic::world_clock::{world_state, DayPhase, Weather};

// ── Helpers ────────────────────────────────────────────────────────────

/// Cycle 0, ten minutes in: clear daylight.
const CLEAR_DAY: i64 = 1_704_067_200_000 + 10 * 60_000;

/// Cycle 2, minute 30: the first shower of the schedule (starts at 15).
const RAINY_DAY: i64 = 1_704_067_200_000 + (2 * 150 + 30) * 60_000;

#[derive(Default)]
struct RecordingQuests {
    events: Vec<(String, Rarity, bool)>,
}

impl QuestHook for RecordingQuests {
    fn on_catch(&mut self, event: &CatchEvent<'_>) -> u32 {
        self.events.push((
            event.item.species.clone(),
            event.item.rarity,
            event.world.is_raining,
        ));
        1
    }
}

fn full_kit() -> EquippedGear {
    EquippedGear {
        rod: Some("rod_carbon".into()),
        hook: Some("hook_golden".into()),
        bait: Some("bait_glowgrub".into()),
    }
}

// ── Scenarios ──────────────────────────────────────────────────────────

#[test]
fn jungle_clear_no_luck_stays_in_zone() {
    let catalog = ZoneCatalog::builtin().unwrap();
    let conditions = CatchConditions {
        zone: "Jungle",
        weather: Weather::Clear,
        phase: DayPhase::Day,
    };
    let mut rng = StdRng::seed_from_u64(2718);
    for _ in 0..5000 {
        let c = generate(
            &catalog,
            &conditions,
            GearStats::default(),
            &GeneratorConfig::default(),
            &mut rng,
        )
        .unwrap();
        assert!(Rarity::ALL.contains(&c.rarity));
        let entry = catalog.entry(&c.species).unwrap();
        assert!(entry.zones.iter().any(|z| z == "Jungle"));
    }
}

#[test]
fn late_catch_expires_and_removes_session() {
    let catalog = ZoneCatalog::builtin().unwrap();
    let rules = FishingRules::default();
    let mut store = MemoryStore::new("Ocean");
    let mut rng = StdRng::seed_from_u64(1);

    let reply = start(&mut store, &catalog, &rules, CLEAR_DAY, &mut rng).unwrap();
    let err = catch(
        &mut store,
        &catalog,
        &mut NoQuests,
        &rules,
        reply.bite_time_ms + 60_000 + 1,
        reply.version,
    )
    .unwrap_err();

    assert!(matches!(err, FishingError::WindowExpired));
    assert_eq!(err.kind(), ErrorKind::Session);
    assert!(store.session.is_none());
    assert_eq!(store.angler.as_ref().unwrap().progress.total_xp, 0);
}

#[test]
fn client_and_server_round_trip() {
    let catalog = ZoneCatalog::builtin().unwrap();
    let rules = FishingRules::default();
    let mut store = MemoryStore::new("Lake").with_gear(full_kit(), 50);
    let mut quests = RecordingQuests::default();
    let mut rng = StdRng::seed_from_u64(99);

    let mut successes = 0;
    let mut now = CLEAR_DAY;
    for attempt in 0..40u64 {
        let mut client = ClientSession::new(ClientConfig::default(), attempt);
        client.begin_cast(now).unwrap();
        now += 550;
        client.release_cast(now).unwrap();

        let reply = start(&mut store, &catalog, &rules, now, &mut rng).unwrap();
        assert!((reply.gear.luck - 30.0).abs() < f32::EPSILON);
        client.on_started(&reply, now).unwrap();

        now += reply.bite_delay_ms;
        assert_eq!(client.poll(now), ClientPhase::ReactionWindow);
        now += 400;
        client.react(now).unwrap();

        let phase = client.run_autopilot(20_000).unwrap();
        let ticks = client.simulation().map_or(0, |s| s.frame().tick);
        now += i64::from(ticks) * 100;

        if phase == ClientPhase::Success {
            let result = catch(
                &mut store,
                &catalog,
                &mut quests,
                &rules,
                now,
                client.version().unwrap(),
            );
            if now <= reply.bite_time_ms + rules.session.catch_window_ms {
                let done = result.unwrap();
                assert_eq!(&done.item, client.candidate().unwrap());
                assert_eq!(done.quests_advanced, 1);
                successes += 1;
            } else {
                assert!(matches!(result, Err(FishingError::WindowExpired)));
            }
        }
        client.finish();
        now += 1_000;
    }

    assert!(successes > 0);
    assert_eq!(store.total_caught(), successes);
    assert_eq!(quests.events.len() as u32, successes);
    assert_eq!(store.bait_count, 50 - successes);

    let progress = store.angler.as_ref().unwrap().progress;
    assert!(progress.total_xp >= u64::from(successes));
    assert!(progress.total_xp >= total_xp_to_level(progress.level));
    assert!(progress.total_xp < total_xp_to_level(progress.level + 1));
}

#[test]
fn quest_hook_sees_the_weather() {
    assert!(world_state(RAINY_DAY).is_raining);

    let catalog = ZoneCatalog::builtin().unwrap();
    let rules = FishingRules::default();
    let mut store = MemoryStore::new("River");
    let mut quests = RecordingQuests::default();
    let mut rng = StdRng::seed_from_u64(5);

    let reply = start(&mut store, &catalog, &rules, RAINY_DAY, &mut rng).unwrap();
    assert!(reply.world.is_raining);
    catch(
        &mut store,
        &catalog,
        &mut quests,
        &rules,
        reply.bite_time_ms + 10_000,
        reply.version,
    )
    .unwrap();

    assert_eq!(quests.events.len(), 1);
    assert!(quests.events[0].2);
}

#[test]
fn cavern_xp_is_doubled() {
    let catalog = ZoneCatalog::builtin().unwrap();
    let rules = FishingRules::default();
    let mut store = MemoryStore::new("Cavern");
    let mut rng = StdRng::seed_from_u64(12);

    let reply = start(&mut store, &catalog, &rules, CLEAR_DAY, &mut rng).unwrap();
    let done = catch(
        &mut store,
        &catalog,
        &mut NoQuests,
        &rules,
        reply.bite_time_ms,
        reply.version,
    )
    .unwrap();
    let base = u64::from(rarity_xp(done.item.rarity));
    assert_eq!(done.award.xp_gained, base * 2);
}

#[test]
fn last_bait_unequips() {
    let catalog = ZoneCatalog::builtin().unwrap();
    let rules = FishingRules::default();
    let mut store = MemoryStore::new("Lake").with_gear(full_kit(), 1);
    let mut rng = StdRng::seed_from_u64(3);

    let first = start(&mut store, &catalog, &rules, CLEAR_DAY, &mut rng).unwrap();
    let done = catch(
        &mut store,
        &catalog,
        &mut NoQuests,
        &rules,
        first.bite_time_ms,
        first.version,
    )
    .unwrap();
    assert_eq!(done.bait, BaitUse::Exhausted);

    // Without bait the luck bonus drops to the rod and hook alone.
    let second = start(&mut store, &catalog, &rules, CLEAR_DAY, &mut rng).unwrap();
    assert!(second.gear.luck < first.gear.luck);
    let done = catch(
        &mut store,
        &catalog,
        &mut NoQuests,
        &rules,
        second.bite_time_ms,
        second.version,
    )
    .unwrap();
    assert_eq!(done.bait, BaitUse::NoneEquipped);
}

#[test]
fn resources_are_logged_without_a_record() {
    let catalog = ZoneCatalog::builtin().unwrap();
    let rules = FishingRules {
        generator: GeneratorConfig {
            resource_chance: 1.0,
            ..GeneratorConfig::default()
        },
        ..FishingRules::default()
    };
    let mut store = MemoryStore::new("Lake");
    let mut rng = StdRng::seed_from_u64(8);

    let reply = start(&mut store, &catalog, &rules, CLEAR_DAY, &mut rng).unwrap();
    assert_eq!(reply.candidate.kind, CatchKind::Resource);
    let done = catch(
        &mut store,
        &catalog,
        &mut NoQuests,
        &rules,
        reply.bite_time_ms,
        reply.version,
    )
    .unwrap();
    assert_eq!(done.record.stack_count, 1);
    assert!(!done.record.new_biggest);
    assert!(store.biggest.is_empty());
}
