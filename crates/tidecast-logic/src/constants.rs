//! Game constants — rarity tiers, weather ids, item kinds, day phases.
//!
//! These are simple `u8` constants with no database dependency.
//! Both the SpacetimeDB server and the native simtest use these.

pub mod rarity_ids {
    pub const COMMON: u8 = 0;
    pub const UNCOMMON: u8 = 1;
    pub const RARE: u8 = 2;
    pub const EPIC: u8 = 3;
    pub const LEGENDARY: u8 = 4;
    pub const MYTHIC: u8 = 5;
}

/// Weather ids as consumed by the catch generator.
pub mod weather_ids {
    pub const CLEAR: u8 = 1;
    pub const RAIN: u8 = 2;
}

pub mod day_phases {
    pub const DAY: u8 = 0;
    pub const NIGHT: u8 = 1;
}

pub mod item_kinds {
    pub const FISH: u8 = 0;
    pub const RESOURCE: u8 = 1;
    pub const ROD: u8 = 2;
    pub const HOOK: u8 = 3;
    pub const BAIT: u8 = 4;
}

/// Modifier ids stored on catch stacks. `NONE` means an unmodified catch.
pub mod modifier_ids {
    pub const NONE: u8 = 0;
    pub const ALBINO: u8 = 1;
    pub const BUFF: u8 = 2;
    pub const ELUSIVE: u8 = 3;
    pub const GOLDEN: u8 = 4;
    pub const GLOWING: u8 = 5;
}

/// Milliseconds per in-game world-clock minute (one real minute).
pub const MS_PER_MINUTE: i64 = 60_000;
