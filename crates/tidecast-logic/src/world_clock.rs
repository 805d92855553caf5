//! World clock — day/night phase and rain derived from wall-clock time.
//!
//! The world state is never stored. Every read recomputes it from an explicit
//! `now_ms` (Unix milliseconds), so the server and every client derive the
//! same phase and weather for the same instant.
//!
//! One cycle lasts 150 minutes: 120 minutes of day followed by 30 of night.
//! Every third cycle (`cycle_number mod 3 == 2`) carries one 45-minute shower
//! whose start offset rotates through a fixed schedule.

use serde::{Deserialize, Serialize};

use crate::constants::{day_phases, weather_ids, MS_PER_MINUTE};

/// Day or night.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayPhase {
    Day,
    Night,
}

impl DayPhase {
    pub fn id(self) -> u8 {
        match self {
            DayPhase::Day => day_phases::DAY,
            DayPhase::Night => day_phases::NIGHT,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            day_phases::DAY => Some(DayPhase::Day),
            day_phases::NIGHT => Some(DayPhase::Night),
            _ => None,
        }
    }
}

/// Weather as seen by the catch generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    Clear,
    Rain,
}

impl Weather {
    /// Wire id: 1 = clear, 2 = rain.
    pub fn id(self) -> u8 {
        match self {
            Weather::Clear => weather_ids::CLEAR,
            Weather::Rain => weather_ids::RAIN,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            weather_ids::CLEAR => Some(Weather::Clear),
            weather_ids::RAIN => Some(Weather::Rain),
            _ => None,
        }
    }
}

/// Clock tuning. The defaults are the live game values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockConfig {
    /// Fixed epoch the cycle counter starts from (Unix ms).
    pub epoch_ms: i64,
    pub cycle_minutes: u32,
    /// Minutes of daylight at the start of each cycle; the rest is night.
    pub day_minutes: u32,
    /// Rain happens when `cycle_number mod rain_every == rain_slot`.
    pub rain_every: i64,
    pub rain_slot: i64,
    /// Rain start offsets (minutes into the cycle), indexed by
    /// `(cycle_number / rain_every) mod len`.
    pub rain_schedule: Vec<u32>,
    pub rain_minutes: u32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            // 2024-01-01T00:00:00Z
            epoch_ms: 1_704_067_200_000,
            cycle_minutes: 150,
            day_minutes: 120,
            rain_every: 3,
            rain_slot: 2,
            rain_schedule: vec![15, 90, 105],
            rain_minutes: 45,
        }
    }
}

impl ClockConfig {
    fn cycle_ms(&self) -> i64 {
        self.cycle_minutes.max(1) as i64 * MS_PER_MINUTE
    }
}

/// Derived world state at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    pub phase: DayPhase,
    pub cycle_number: i64,
    /// Minutes into the current cycle, in `[0, cycle_minutes)`.
    pub cycle_minute: f64,
    pub is_raining: bool,
    /// Start offset of this cycle's shower, if the cycle has one.
    pub rain_start_minute: Option<u32>,
}

impl WorldState {
    pub fn weather(&self) -> Weather {
        if self.is_raining {
            Weather::Rain
        } else {
            Weather::Clear
        }
    }

    pub fn weather_id(&self) -> u8 {
        self.weather().id()
    }
}

/// World state at `now_ms` under the live clock configuration.
pub fn world_state(now_ms: i64) -> WorldState {
    world_state_with(&ClockConfig::default(), now_ms)
}

/// World state at `now_ms` under an explicit configuration.
pub fn world_state_with(config: &ClockConfig, now_ms: i64) -> WorldState {
    let cycle_ms = config.cycle_ms();
    let elapsed = now_ms - config.epoch_ms;
    let cycle_number = elapsed.div_euclid(cycle_ms);
    let cycle_minute = elapsed.rem_euclid(cycle_ms) as f64 / MS_PER_MINUTE as f64;

    let phase = if cycle_minute < config.day_minutes as f64 {
        DayPhase::Day
    } else {
        DayPhase::Night
    };

    let rain_start_minute = rain_start_for_cycle(config, cycle_number);
    let is_raining = rain_start_minute.is_some_and(|start| {
        let start = start as f64;
        cycle_minute >= start && cycle_minute < start + config.rain_minutes as f64
    });

    WorldState {
        phase,
        cycle_number,
        cycle_minute,
        is_raining,
        rain_start_minute,
    }
}

/// Rain start offset for a cycle, or `None` for a dry cycle.
pub fn rain_start_for_cycle(config: &ClockConfig, cycle_number: i64) -> Option<u32> {
    let every = config.rain_every.max(1);
    if cycle_number.rem_euclid(every) != config.rain_slot || config.rain_schedule.is_empty() {
        return None;
    }
    let idx = cycle_number
        .div_euclid(every)
        .rem_euclid(config.rain_schedule.len() as i64) as usize;
    Some(config.rain_schedule[idx])
}

/// Advance a previously polled state by `elapsed_ms` of local wall time.
///
/// Clients call this between polls; the result is identical to
/// recomputing from the server's `now` plus the same delta.
pub fn extrapolate(config: &ClockConfig, state: &WorldState, elapsed_ms: i64) -> WorldState {
    let base = config.epoch_ms
        + state.cycle_number * config.cycle_ms()
        + (state.cycle_minute * MS_PER_MINUTE as f64).round() as i64;
    world_state_with(config, base + elapsed_ms)
}
