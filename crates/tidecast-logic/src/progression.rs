//! Angler experience and levels.
//!
//! Each catch grants XP by rarity, scaled by the zone's multiplier. Levels
//! follow a gentle exponential curve: level `n` costs `round(10 * 1.056^(n-1))`.
//!
//! ```
//! use tidecast_logic::progression::{apply_xp, Progress};
//!
//! let after = apply_xp(Progress::default(), 25);
//! assert_eq!(after.progress.level, 3);
//! assert_eq!(after.levels_gained, 2);
//! ```

use serde::{Deserialize, Serialize};

use crate::catalog::Rarity;

/// Base XP for catching an item of `rarity`.
pub fn rarity_xp(rarity: Rarity) -> u32 {
    match rarity {
        Rarity::Common => 1,
        Rarity::Uncommon => 3,
        Rarity::Rare => 10,
        Rarity::Epic => 25,
        Rarity::Legendary => 75,
        Rarity::Mythic => 200,
    }
}

/// XP for one catch after the zone multiplier.
pub fn catch_xp(rarity: Rarity, zone_multiplier: f32) -> u64 {
    (rarity_xp(rarity) as f64 * zone_multiplier.max(0.0) as f64).round() as u64
}

/// XP needed to advance from level `n` to `n + 1`.
pub fn xp_to_level(n: u32) -> u64 {
    (10.0 * 1.056f64.powi(n.max(1) as i32 - 1)).round() as u64
}

/// Cumulative XP at which `level` is reached. Level 1 is free.
pub fn total_xp_to_level(level: u32) -> u64 {
    (1..level).map(xp_to_level).sum()
}

/// Level for a cumulative XP total.
pub fn level_for_xp(total_xp: u64) -> u32 {
    let mut level = 1;
    while total_xp >= total_xp_to_level(level + 1) {
        level += 1;
    }
    level
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub total_xp: u64,
    pub level: u32,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            total_xp: 0,
            level: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XpAward {
    pub progress: Progress,
    pub xp_gained: u64,
    pub levels_gained: u32,
}

/// Add `xp` and level up while the total covers the next level.
pub fn apply_xp(progress: Progress, xp: u64) -> XpAward {
    let total_xp = progress.total_xp.saturating_add(xp);
    let mut level = progress.level.max(1);
    while total_xp >= total_xp_to_level(level + 1) {
        level += 1;
    }
    XpAward {
        progress: Progress { total_xp, level },
        xp_gained: xp,
        levels_gained: level - progress.level.max(1),
    }
}
