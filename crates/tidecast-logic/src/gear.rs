//! Equipped gear and the stats it contributes to a catch attempt.
//!
//! Rod, hook and bait each add `{focus, line_tension, luck}`. The sum drives
//! the tug simulation (focus, line tension) and the rarity roll (luck).

use serde::{Deserialize, Serialize};

use crate::constants::item_kinds;

/// Equipment slot a gear item occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GearSlot {
    Rod,
    Hook,
    Bait,
}

impl GearSlot {
    pub const ALL: [GearSlot; 3] = [GearSlot::Rod, GearSlot::Hook, GearSlot::Bait];

    pub fn item_kind(self) -> u8 {
        match self {
            GearSlot::Rod => item_kinds::ROD,
            GearSlot::Hook => item_kinds::HOOK,
            GearSlot::Bait => item_kinds::BAIT,
        }
    }
}

/// Reference definition of one piece of gear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GearItem {
    pub id: String,
    pub name: String,
    pub slot: GearSlot,
    #[serde(default)]
    pub focus: f32,
    #[serde(default)]
    pub line_tension: f32,
    #[serde(default)]
    pub luck: f32,
}

/// Gear ids currently equipped by an angler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquippedGear {
    pub rod: Option<String>,
    pub hook: Option<String>,
    pub bait: Option<String>,
}

impl EquippedGear {
    pub fn slot(&self, slot: GearSlot) -> Option<&str> {
        match slot {
            GearSlot::Rod => self.rod.as_deref(),
            GearSlot::Hook => self.hook.as_deref(),
            GearSlot::Bait => self.bait.as_deref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rod.is_none() && self.hook.is_none() && self.bait.is_none()
    }
}

/// Summed stats of the equipped gear.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GearStats {
    /// Focus capacity; drains while the player steers.
    pub focus: f32,
    /// Line strength; scales how fast tension builds.
    pub line_tension: f32,
    /// Shifts rarity weights toward rare and above.
    pub luck: f32,
}

impl GearStats {
    pub const DEFAULT_FOCUS: f32 = 100.0;
    pub const DEFAULT_LINE_TENSION: f32 = 100.0;
    pub const DEFAULT_LUCK: f32 = 0.0;

    /// Sum the contributions of every equipped item.
    ///
    /// `lookup` resolves a gear id; unknown ids contribute nothing. Focus and
    /// line tension whose summed contribution is zero fall back to their
    /// defaults, so a bare hook never leaves the player with no focus.
    pub fn from_equipped<'a>(
        equipped: &EquippedGear,
        lookup: impl Fn(&str) -> Option<&'a GearItem>,
    ) -> Self {
        let mut focus = 0.0;
        let mut line_tension = 0.0;
        let mut luck = 0.0;
        for slot in GearSlot::ALL {
            let Some(item) = equipped.slot(slot).and_then(&lookup) else {
                continue;
            };
            focus += item.focus;
            line_tension += item.line_tension;
            luck += item.luck;
        }
        Self {
            focus: if focus > 0.0 { focus } else { Self::DEFAULT_FOCUS },
            line_tension: if line_tension > 0.0 {
                line_tension
            } else {
                Self::DEFAULT_LINE_TENSION
            },
            luck: luck.max(Self::DEFAULT_LUCK),
        }
    }
}

impl Default for GearStats {
    fn default() -> Self {
        Self {
            focus: Self::DEFAULT_FOCUS,
            line_tension: Self::DEFAULT_LINE_TENSION,
            luck: Self::DEFAULT_LUCK,
        }
    }
}
