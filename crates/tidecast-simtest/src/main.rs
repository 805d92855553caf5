//! Tidecast Headless Harness
//!
//! Validates fishing logic and bundled data without SpacetimeDB.
//! Runs entirely in-process — no DB, no networking, no rendering.
//!
//! Usage:
//!   cargo run -p tidecast-simtest
//!   cargo run -p tidecast-simtest -- --verbose

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use tidecast_logic::bar_layout::{BarLayout, ZoneColor};
use tidecast_logic::catalog::{BarType, CatchKind, Rarity, ZoneCatalog};
use tidecast_logic::client::{ClientConfig, ClientPhase, ClientSession};
use tidecast_logic::error::FishingError;
use tidecast_logic::fish_intent::IntentConfig;
use tidecast_logic::gear::{EquippedGear, GearSlot};
use tidecast_logic::generator::{generate, rarity_weights, CatchConditions, GeneratorConfig};
use tidecast_logic::progression::{level_for_xp, total_xp_to_level, xp_to_level};
use tidecast_logic::protocol::{catch, start, FishingRules};
use tidecast_logic::quests::starter_quests;
use tidecast_logic::store::{MemoryStore, NoQuests};
use tidecast_logic::tug::{
    steer_toward_green, StartBonuses, TugConfig, TugOutcome, TugSimulation,
};
use tidecast_logic::world_clock::{extrapolate, world_state_with, ClockConfig, DayPhase, Weather};

// ── Raw catalog (same JSON the server embeds) ───────────────────────────
const CATALOG_JSON: &str = include_str!("../../../data/catalog.json");

#[derive(Debug, Deserialize)]
struct RawCatalog {
    zones: Vec<serde_json::Value>,
    entries: Vec<serde_json::Value>,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn main() {
    let verbose = std::env::args().any(|a| a == "--verbose");
    println!("=== Tidecast Fishing Harness ===\n");

    let catalog = match ZoneCatalog::builtin() {
        Ok(c) => c,
        Err(e) => {
            println!("  ✗ catalog_load: {}", e);
            std::process::exit(1);
        }
    };

    let mut results = Vec::new();

    // 1. Catalog data validation
    results.extend(validate_catalog(&catalog, verbose));

    // 2. World clock sweep
    results.extend(validate_world_clock(verbose));

    // 3. Rarity Monte Carlo
    results.extend(validate_rarity(&catalog, verbose));

    // 4. Tug simulation with autopilot
    results.extend(validate_tug(&catalog, verbose));

    // 5. Protocol round trips
    results.extend(validate_protocol(&catalog, verbose));

    // 6. Progression curve
    results.extend(validate_progression(verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Catalog ──────────────────────────────────────────────────────────

fn validate_catalog(catalog: &ZoneCatalog, verbose: bool) -> Vec<TestResult> {
    println!("--- Catalog ---");
    let mut results = Vec::new();

    // Typed parse must not silently drop records
    match serde_json::from_str::<RawCatalog>(CATALOG_JSON) {
        Ok(raw) => results.push(TestResult {
            name: "catalog_complete_parse".into(),
            passed: raw.zones.len() == catalog.zones.len()
                && raw.entries.len() == catalog.entries.len(),
            detail: format!(
                "{} zones, {} entries",
                catalog.zones.len(),
                catalog.entries.len()
            ),
        }),
        Err(e) => results.push(TestResult {
            name: "catalog_complete_parse".into(),
            passed: false,
            detail: format!("JSON parse error: {}", e),
        }),
    }

    // Every zone has fish and something catchable in every condition
    let mut empty_zones = Vec::new();
    for zone in &catalog.zones {
        let pool = catalog.zone_entries(&zone.name);
        let fish = pool.iter().filter(|e| e.kind == CatchKind::Fish).count();
        let resources = pool.len() - fish;
        let commons = pool.iter().filter(|e| e.rarity == Rarity::Common).count();
        if verbose {
            println!(
                "  {:<8} fish={:<2} resources={} commons={} xp×{}",
                zone.name, fish, resources, commons, zone.xp_multiplier
            );
        }
        if fish == 0 || commons == 0 {
            empty_zones.push(zone.name.clone());
        }
    }
    results.push(TestResult {
        name: "catalog_zones_stocked".into(),
        passed: empty_zones.is_empty(),
        detail: if empty_zones.is_empty() {
            "every zone has fish and a common tier".into()
        } else {
            format!("under-stocked: {:?}", empty_zones)
        },
    });

    // Entries only reference known zones
    let orphans: Vec<_> = catalog
        .entries
        .iter()
        .filter(|e| e.zones.iter().any(|z| catalog.zone(z).is_none()))
        .map(|e| e.name.clone())
        .collect();
    results.push(TestResult {
        name: "catalog_known_zones".into(),
        passed: orphans.is_empty(),
        detail: format!("{} entries reference unknown zones", orphans.len()),
    });

    // Gear covers each slot
    let slots_covered = GearSlot::ALL
        .iter()
        .all(|slot| catalog.gear.iter().any(|g| g.slot == *slot));
    results.push(TestResult {
        name: "catalog_gear_slots".into(),
        passed: slots_covered,
        detail: format!("{} gear items", catalog.gear.len()),
    });

    // Starter quests load
    match starter_quests() {
        Ok(quests) => results.push(TestResult {
            name: "quests_parse".into(),
            passed: !quests.is_empty() && quests.iter().all(|q| q.required > 0),
            detail: format!("{} starter quests", quests.len()),
        }),
        Err(e) => results.push(TestResult {
            name: "quests_parse".into(),
            passed: false,
            detail: format!("JSON parse error: {}", e),
        }),
    }

    results
}

// ── 2. World Clock ──────────────────────────────────────────────────────

fn validate_world_clock(verbose: bool) -> Vec<TestResult> {
    println!("--- World Clock ---");
    let mut results = Vec::new();
    let cfg = ClockConfig::default();

    // Minute-by-minute sweep over 30 cycles
    let cycles = 30i64;
    let mut rain_minutes: BTreeMap<i64, u32> = BTreeMap::new();
    let mut night_minutes = 0u32;
    for minute in 0..cycles * cfg.cycle_minutes as i64 {
        let state = world_state_with(&cfg, cfg.epoch_ms + minute * 60_000);
        if state.is_raining {
            *rain_minutes.entry(state.cycle_number).or_insert(0) += 1;
        }
        if state.phase == DayPhase::Night {
            night_minutes += 1;
        }
    }
    if verbose {
        println!("  rainy cycles: {:?}", rain_minutes);
    }
    results.push(TestResult {
        name: "clock_rain_every_third_cycle".into(),
        passed: rain_minutes.len() as i64 == cycles / 3
            && rain_minutes
                .iter()
                .all(|(cycle, minutes)| cycle % 3 == 2 && *minutes == cfg.rain_minutes),
        detail: format!("{} rainy cycles of {} minutes", rain_minutes.len(), cfg.rain_minutes),
    });

    results.push(TestResult {
        name: "clock_night_share".into(),
        passed: night_minutes as i64 == cycles * (cfg.cycle_minutes - cfg.day_minutes) as i64,
        detail: format!("{} night minutes over {} cycles", night_minutes, cycles),
    });

    // Extrapolating a poll matches recomputing
    let t0 = cfg.epoch_ms + 1_234_567;
    let polled = world_state_with(&cfg, t0);
    let mismatches = (0..500)
        .map(|i| i * 37_000)
        .filter(|dt| extrapolate(&cfg, &polled, *dt) != world_state_with(&cfg, t0 + dt))
        .count();
    results.push(TestResult {
        name: "clock_extrapolate".into(),
        passed: mismatches == 0,
        detail: format!("{} mismatches over 500 offsets", mismatches),
    });

    results
}

// ── 3. Rarity ───────────────────────────────────────────────────────────

fn validate_rarity(catalog: &ZoneCatalog, verbose: bool) -> Vec<TestResult> {
    println!("--- Rarity ---");
    let mut results = Vec::new();
    let config = GeneratorConfig {
        resource_chance: 0.0,
        ..GeneratorConfig::default()
    };

    // Monte Carlo against the analytic distribution. Jungle stocks every tier.
    let rolls = 100_000;
    for weather in [Weather::Clear, Weather::Rain] {
        let conditions = CatchConditions {
            zone: "Jungle",
            weather,
            phase: DayPhase::Day,
        };
        let expected = rarity_weights(&config.rarity, weather, 0.0);
        let mut counts = [0u32; 6];
        let mut rng = StdRng::seed_from_u64(2024);
        let mut failures = 0;
        for _ in 0..rolls {
            match generate(catalog, &conditions, Default::default(), &config, &mut rng) {
                Ok(c) => counts[c.rarity.index()] += 1,
                Err(_) => failures += 1,
            }
        }
        let worst = Rarity::ALL
            .iter()
            .map(|r| (counts[r.index()] as f64 / rolls as f64 - expected[r.index()]).abs())
            .fold(0.0, f64::max);
        if verbose {
            println!("  {:?}: counts {:?}", weather, counts);
        }
        results.push(TestResult {
            name: format!("rarity_monte_carlo_{:?}", weather).to_lowercase(),
            passed: failures == 0 && worst < 0.01,
            detail: format!("max deviation {:.4} over {} rolls", worst, rolls),
        });
    }

    // Luck shifts mass upward
    let rare_mass = |luck: f32| {
        let w = rarity_weights(&config.rarity, Weather::Clear, luck);
        Rarity::ALL
            .iter()
            .filter(|r| r.is_luck_boosted())
            .map(|r| w[r.index()])
            .sum::<f64>()
    };
    results.push(TestResult {
        name: "rarity_luck_monotonic".into(),
        passed: rare_mass(0.0) < rare_mass(10.0) && rare_mass(10.0) < rare_mass(30.0),
        detail: format!(
            "rare+ mass {:.3} → {:.3} → {:.3}",
            rare_mass(0.0),
            rare_mass(10.0),
            rare_mass(30.0)
        ),
    });

    results
}

// ── 4. Tug Simulation ───────────────────────────────────────────────────

fn validate_tug(catalog: &ZoneCatalog, verbose: bool) -> Vec<TestResult> {
    println!("--- Tug Simulation ---");
    let mut results = Vec::new();
    let config = GeneratorConfig {
        resource_chance: 0.0,
        modifier_chance: 0.0,
        ..GeneratorConfig::default()
    };
    let gear = catalog.gear_stats(&EquippedGear {
        rod: Some("rod_fiberglass".into()),
        hook: Some("hook_barbed".into()),
        bait: Some("bait_cricket".into()),
    });

    let mut out_of_bounds = 0;
    let mut per_bar: BTreeMap<String, (u32, u32)> = BTreeMap::new();
    let mut rng = StdRng::seed_from_u64(31);
    for (i, zone) in catalog.zones.iter().enumerate() {
        let conditions = CatchConditions {
            zone: &zone.name,
            weather: Weather::Clear,
            phase: DayPhase::Day,
        };
        for run in 0..40u64 {
            let Ok(candidate) = generate(catalog, &conditions, gear, &config, &mut rng) else {
                continue;
            };
            let mut sim = TugSimulation::new(
                &candidate,
                StartBonuses {
                    cast: 5.0,
                    reaction: 10.0,
                },
                (i as u64) * 1000 + run,
                TugConfig::default(),
                IntentConfig::default(),
            );
            let mut outcome = None;
            for _ in 0..6000 {
                let input = steer_toward_green(sim.frame(), &sim.layout());
                let step = sim.tick(input);
                let f = &step.frame;
                if !(0.0..=100.0).contains(&f.balance)
                    || !(0.0..=100.0).contains(&f.line_tension)
                    || f.stamina < 0.0
                    || f.stamina > sim.max_stamina()
                {
                    out_of_bounds += 1;
                }
                if step.outcome.is_some() {
                    outcome = step.outcome;
                    break;
                }
            }
            let entry = per_bar
                .entry(format!("{:?}", candidate.bar_type))
                .or_insert((0, 0));
            entry.1 += 1;
            if outcome == Some(TugOutcome::Caught) {
                entry.0 += 1;
            }
        }
    }
    if verbose {
        for (bar, (caught, runs)) in &per_bar {
            println!("  {:<14} {}/{} caught", bar, caught, runs);
        }
    }

    results.push(TestResult {
        name: "tug_bounds".into(),
        passed: out_of_bounds == 0,
        detail: format!("{} out-of-range frames", out_of_bounds),
    });

    let (caught, runs) = per_bar
        .values()
        .fold((0, 0), |(c, r), (bc, br)| (c + bc, r + br));
    results.push(TestResult {
        name: "tug_autopilot_lands_fish".into(),
        passed: caught > 0 && runs > 0,
        detail: format!("{}/{} caught across {} bar types", caught, runs, per_bar.len()),
    });

    // Static layouts always offer green somewhere
    let greenless: Vec<_> = [
        BarType::Middle,
        BarType::MiddleSmall,
        BarType::Low,
        BarType::High,
        BarType::Double,
    ]
    .into_iter()
    .filter(|b| {
        let layout = BarLayout::resolve(*b, 0.0, 0.0);
        (0..=100).all(|x| layout.color_at(x as f32) != ZoneColor::Green)
    })
    .collect();
    results.push(TestResult {
        name: "tug_layouts_have_green".into(),
        passed: greenless.is_empty(),
        detail: format!("{} layouts without green", greenless.len()),
    });

    results
}

// ── 5. Protocol ─────────────────────────────────────────────────────────

fn validate_protocol(catalog: &ZoneCatalog, verbose: bool) -> Vec<TestResult> {
    println!("--- Protocol ---");
    let mut results = Vec::new();
    let rules = FishingRules::default();
    let t0 = rules.clock.epoch_ms + 7 * 60_000;

    // Client + server loop with the autopilot
    let mut store = MemoryStore::new("River").with_gear(
        EquippedGear {
            rod: Some("rod_carbon".into()),
            hook: Some("hook_golden".into()),
            bait: Some("bait_worm".into()),
        },
        100,
    );
    let mut rng = StdRng::seed_from_u64(77);
    let mut now = t0;
    let (mut caught, mut escaped, mut expired, mut errors) = (0, 0, 0, 0);
    for attempt in 0..60u64 {
        let mut client = ClientSession::new(ClientConfig::default(), attempt);
        if client.begin_cast(now).is_err() {
            errors += 1;
            continue;
        }
        now += 450;
        let _ = client.release_cast(now);
        let reply = match start(&mut store, catalog, &rules, now, &mut rng) {
            Ok(r) => r,
            Err(_) => {
                errors += 1;
                continue;
            }
        };
        let _ = client.on_started(&reply, now);
        now += reply.bite_delay_ms + 700;
        let _ = client.react(now);
        let phase = client.run_autopilot(10_000).unwrap_or(ClientPhase::Failure);
        now += client
            .simulation()
            .map_or(0, |s| i64::from(s.frame().tick) * 100);

        if phase == ClientPhase::Success {
            match catch(&mut store, catalog, &mut NoQuests, &rules, now, reply.version) {
                Ok(_) => caught += 1,
                Err(FishingError::WindowExpired) => expired += 1,
                Err(_) => errors += 1,
            }
        } else {
            escaped += 1;
        }
        client.finish();
        now += 2_000;
    }
    if verbose {
        let progress = store.angler.as_ref().map(|a| a.progress);
        println!(
            "  caught={} escaped={} expired={} errors={} progress={:?}",
            caught, escaped, expired, errors, progress
        );
    }
    results.push(TestResult {
        name: "protocol_round_trips".into(),
        passed: errors == 0 && caught > 0 && store.total_caught() == caught,
        detail: format!("{} caught, {} escaped, {} expired", caught, escaped, expired),
    });

    // Late catch discards the session
    let mut late = MemoryStore::new("Lake");
    let late_ok = match start(&mut late, catalog, &rules, t0, &mut rng) {
        Ok(reply) => {
            let result = catch(
                &mut late,
                catalog,
                &mut NoQuests,
                &rules,
                reply.bite_time_ms + rules.session.catch_window_ms + 1,
                reply.version,
            );
            matches!(result, Err(FishingError::WindowExpired)) && late.session.is_none()
        }
        Err(_) => false,
    };
    results.push(TestResult {
        name: "protocol_window_expired".into(),
        passed: late_ok,
        detail: "late catch → window expired, session gone".into(),
    });

    // Double submission grants once
    let mut twice = MemoryStore::new("Ocean");
    let twice_ok = match start(&mut twice, catalog, &rules, t0, &mut rng) {
        Ok(reply) => {
            let at = reply.bite_time_ms + 10;
            let first = catch(&mut twice, catalog, &mut NoQuests, &rules, at, reply.version);
            let second = catch(&mut twice, catalog, &mut NoQuests, &rules, at, reply.version);
            first.is_ok() && matches!(second, Err(FishingError::NoSession)) && twice.total_caught() == 1
        }
        Err(_) => false,
    };
    results.push(TestResult {
        name: "protocol_idempotent_catch".into(),
        passed: twice_ok,
        detail: "retry after success → no session".into(),
    });

    // Racing starts: the older version is refused
    let mut race = MemoryStore::new("Jungle");
    let race_ok = match (
        start(&mut race, catalog, &rules, t0, &mut rng),
        start(&mut race, catalog, &rules, t0 + 5, &mut rng),
    ) {
        (Ok(old), Ok(new)) => {
            let at = old.bite_time_ms.max(new.bite_time_ms);
            let stale = catch(&mut race, catalog, &mut NoQuests, &rules, at, old.version);
            let fresh = catch(&mut race, catalog, &mut NoQuests, &rules, at, new.version);
            matches!(stale, Err(FishingError::SessionMismatch { .. })) && fresh.is_ok()
        }
        _ => false,
    };
    results.push(TestResult {
        name: "protocol_last_start_wins".into(),
        passed: race_ok,
        detail: "stale version rejected, newest accepted".into(),
    });

    results
}

// ── 6. Progression ──────────────────────────────────────────────────────

fn validate_progression(verbose: bool) -> Vec<TestResult> {
    println!("--- Progression ---");
    let mut results = Vec::new();

    let monotonic = (1..100).all(|n| xp_to_level(n + 1) >= xp_to_level(n));
    results.push(TestResult {
        name: "progression_curve_monotonic".into(),
        passed: monotonic && xp_to_level(1) == 10,
        detail: format!(
            "level 1→2 costs {}, 49→50 costs {}",
            xp_to_level(1),
            xp_to_level(49)
        ),
    });

    let consistent = (1..60).all(|level| level_for_xp(total_xp_to_level(level)) == level);
    if verbose {
        for level in [2, 5, 10, 25, 50] {
            println!("  level {:>2} at {:>5} xp", level, total_xp_to_level(level));
        }
    }
    results.push(TestResult {
        name: "progression_thresholds".into(),
        passed: consistent,
        detail: "reaching a threshold lands exactly on its level".into(),
    });

    results
}
