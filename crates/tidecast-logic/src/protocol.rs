//! The two fishing endpoints, `start` and `catch`, over any [`FishingStore`].
//!
//! Both are stateless: every call reads what it needs from the store, decides
//! by comparing `now_ms` against stored timestamps, and writes back. The only
//! shared mutable record is the angler's single session.
//!
//! `catch` order matters:
//!
//! 1. No session → [`FishingError::NoSession`].
//! 2. Version mismatch → [`FishingError::SessionMismatch`]; the newer session
//!    is left alone.
//! 3. Before the bite or past the catch window → session deleted, rejected.
//! 4. Bait, catch log, XP, quests, then the session row is deleted last, so
//!    a retried call finds nothing to grant.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::ZoneCatalog;
use crate::error::FishingError;
use crate::gear::GearStats;
use crate::generator::{generate, CatchCandidate, CatchConditions, GeneratorConfig};
use crate::progression::{apply_xp, catch_xp, XpAward};
use crate::session::{CatchTiming, FishingSession, SessionConfig};
use crate::store::{BaitUse, CatchEvent, CatchRecord, FishingStore, QuestHook};
use crate::world_clock::{world_state_with, ClockConfig, WorldState};

/// Every tunable the endpoints consult.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FishingRules {
    pub clock: ClockConfig,
    pub generator: GeneratorConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StartReply {
    /// Quote this back to `catch`.
    pub version: u64,
    pub bite_delay_ms: i64,
    pub bite_time_ms: i64,
    /// Everything the client needs to run the simulation.
    pub candidate: CatchCandidate,
    pub gear: GearStats,
    pub world: WorldState,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatchReply {
    pub item: CatchCandidate,
    pub bait: BaitUse,
    pub record: CatchRecord,
    pub award: XpAward,
    pub quests_advanced: u32,
    pub world: WorldState,
}

/// Roll a catch for the angler's zone and open a session, replacing any
/// earlier one.
pub fn start<S, R>(
    store: &mut S,
    catalog: &ZoneCatalog,
    rules: &FishingRules,
    now_ms: i64,
    rng: &mut R,
) -> Result<StartReply, FishingError>
where
    S: FishingStore + ?Sized,
    R: Rng + ?Sized,
{
    let angler = store.angler()?;
    let gear = catalog.gear_stats(&store.equipped_gear());
    let world = world_state_with(&rules.clock, now_ms);
    let conditions = CatchConditions {
        zone: &angler.zone,
        weather: world.weather(),
        phase: world.phase,
    };
    let candidate = generate(catalog, &conditions, gear, &rules.generator, rng)?;
    let bite_delay_ms = rules.session.roll_bite_delay(rng);

    let version = store.next_session_version();
    let session = FishingSession::new(version, candidate, now_ms, bite_delay_ms);
    store.save_session(&session)?;

    Ok(StartReply {
        version,
        bite_delay_ms,
        bite_time_ms: session.bite_time_ms,
        candidate: session.candidate,
        gear,
        world,
    })
}

/// Grant the session's catch, if the call is plausible.
pub fn catch<S, Q>(
    store: &mut S,
    catalog: &ZoneCatalog,
    quests: &mut Q,
    rules: &FishingRules,
    now_ms: i64,
    version: u64,
) -> Result<CatchReply, FishingError>
where
    S: FishingStore + ?Sized,
    Q: QuestHook + ?Sized,
{
    let Some(session) = store.load_session()? else {
        return Err(FishingError::NoSession);
    };
    if session.version != version {
        return Err(FishingError::SessionMismatch {
            given: version,
            current: session.version,
        });
    }
    match session.catch_timing(&rules.session, now_ms) {
        CatchTiming::TooEarly => {
            store.delete_session();
            return Err(FishingError::TooEarly);
        }
        CatchTiming::Expired => {
            store.delete_session();
            return Err(FishingError::WindowExpired);
        }
        CatchTiming::InWindow => {}
    }

    let angler = store.angler()?;
    let item = session.candidate;
    let bait = store.consume_bait();
    let record = store.record_catch(&item, now_ms);

    let xp = catch_xp(item.rarity, catalog.xp_multiplier(&angler.zone));
    let award = apply_xp(angler.progress, xp);
    store.save_progress(award.progress);

    let world = world_state_with(&rules.clock, now_ms);
    let quests_advanced = quests.on_catch(&CatchEvent {
        zone: &angler.zone,
        item: &item,
        world: &world,
    });

    store.delete_session();

    Ok(CatchReply {
        item,
        bait,
        record,
        award,
        quests_advanced,
        world,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::gear::EquippedGear;
    use crate::store::{MemoryStore, NoQuests};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const NOW: i64 = 1_704_067_200_000 + 10 * 60_000;

    fn setup() -> (MemoryStore, ZoneCatalog, FishingRules, StdRng) {
        (
            MemoryStore::new("Lake"),
            ZoneCatalog::builtin().unwrap(),
            FishingRules::default(),
            StdRng::seed_from_u64(17),
        )
    }

    #[test]
    fn start_persists_session_and_reports_delay() {
        let (mut store, catalog, rules, mut rng) = setup();
        let reply = start(&mut store, &catalog, &rules, NOW, &mut rng).unwrap();
        assert!((4000..=8000).contains(&reply.bite_delay_ms));
        assert_eq!(reply.bite_time_ms, NOW + reply.bite_delay_ms);
        let session = store.session.as_ref().unwrap();
        assert_eq!(session.version, reply.version);
        assert_eq!(session.candidate, reply.candidate);
        assert!(catalog.entry(&reply.candidate.species).unwrap().in_zone("Lake"));
    }

    #[test]
    fn second_start_overwrites_first() {
        let (mut store, catalog, rules, mut rng) = setup();
        let first = start(&mut store, &catalog, &rules, NOW, &mut rng).unwrap();
        let second = start(&mut store, &catalog, &rules, NOW + 100, &mut rng).unwrap();
        assert!(second.version > first.version);
        assert_eq!(store.session.as_ref().unwrap().version, second.version);
    }

    #[test]
    fn catch_in_window_grants_and_deletes() {
        let (mut store, catalog, rules, mut rng) = setup();
        let reply = start(&mut store, &catalog, &rules, NOW, &mut rng).unwrap();
        let done = catch(
            &mut store,
            &catalog,
            &mut NoQuests,
            &rules,
            reply.bite_time_ms + 5_000,
            reply.version,
        )
        .unwrap();
        assert_eq!(done.item, reply.candidate);
        assert_eq!(done.bait, BaitUse::NoneEquipped);
        assert_eq!(done.record.stack_count, 1);
        assert!(done.award.xp_gained >= 1);
        assert!(store.session.is_none());
        assert_eq!(store.angler.as_ref().unwrap().progress, done.award.progress);
    }

    #[test]
    fn retried_catch_finds_no_session() {
        let (mut store, catalog, rules, mut rng) = setup();
        let reply = start(&mut store, &catalog, &rules, NOW, &mut rng).unwrap();
        let at = reply.bite_time_ms + 1;
        catch(&mut store, &catalog, &mut NoQuests, &rules, at, reply.version).unwrap();
        let again = catch(&mut store, &catalog, &mut NoQuests, &rules, at, reply.version);
        assert!(matches!(again, Err(FishingError::NoSession)));
        assert_eq!(store.total_caught(), 1);
    }

    #[test]
    fn expired_window_deletes_session() {
        let (mut store, catalog, rules, mut rng) = setup();
        let reply = start(&mut store, &catalog, &rules, NOW, &mut rng).unwrap();
        let late = reply.bite_time_ms + 60_001;
        let err = catch(&mut store, &catalog, &mut NoQuests, &rules, late, reply.version)
            .unwrap_err();
        assert!(matches!(err, FishingError::WindowExpired));
        assert_eq!(err.kind(), ErrorKind::Session);
        assert!(store.session.is_none());
        assert_eq!(store.total_caught(), 0);
    }

    #[test]
    fn early_catch_is_rejected_and_discarded() {
        let (mut store, catalog, rules, mut rng) = setup();
        let reply = start(&mut store, &catalog, &rules, NOW, &mut rng).unwrap();
        let err = catch(
            &mut store,
            &catalog,
            &mut NoQuests,
            &rules,
            reply.bite_time_ms - 1,
            reply.version,
        )
        .unwrap_err();
        assert!(matches!(err, FishingError::TooEarly));
        assert!(store.session.is_none());
    }

    #[test]
    fn stale_version_leaves_newer_session() {
        let (mut store, catalog, rules, mut rng) = setup();
        let old = start(&mut store, &catalog, &rules, NOW, &mut rng).unwrap();
        let new = start(&mut store, &catalog, &rules, NOW, &mut rng).unwrap();
        let err = catch(
            &mut store,
            &catalog,
            &mut NoQuests,
            &rules,
            new.bite_time_ms.max(old.bite_time_ms),
            old.version,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            FishingError::SessionMismatch { given, current } if given == old.version && current == new.version
        ));
        assert_eq!(store.session.as_ref().unwrap().version, new.version);
    }

    #[test]
    fn bait_is_consumed_on_catch() {
        let (store, catalog, rules, mut rng) = setup();
        let mut store = store.with_gear(
            EquippedGear {
                rod: Some("rod_bamboo".into()),
                hook: None,
                bait: Some("bait_worm".into()),
            },
            1,
        );
        let reply = start(&mut store, &catalog, &rules, NOW, &mut rng).unwrap();
        let done = catch(
            &mut store,
            &catalog,
            &mut NoQuests,
            &rules,
            reply.bite_time_ms,
            reply.version,
        )
        .unwrap();
        assert_eq!(done.bait, BaitUse::Exhausted);
        assert!(store.equipped.bait.is_none());
    }

    #[test]
    fn unregistered_angler_cannot_start() {
        let (_, catalog, rules, mut rng) = setup();
        let mut store = MemoryStore::default();
        let err = start(&mut store, &catalog, &rules, NOW, &mut rng).unwrap_err();
        assert!(matches!(err, FishingError::UnknownAngler));
    }

    #[test]
    fn empty_zone_is_configuration_error() {
        let (_, catalog, rules, mut rng) = setup();
        let mut store = MemoryStore::new("Moon");
        let err = start(&mut store, &catalog, &rules, NOW, &mut rng).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(store.session.is_none());
    }
}
