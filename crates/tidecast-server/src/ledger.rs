//! Table-backed implementations of the logic crate's store and quest seams.
//!
//! A [`PlayerLedger`] is one angler's view of the database for the span of a
//! single reducer call.

use spacetimedb::{Identity, ReducerContext, Table};
use tidecast_logic::catalog::{CatchKind, Rarity};
use tidecast_logic::error::FishingError;
use tidecast_logic::gear::EquippedGear;
use tidecast_logic::generator::{CatchCandidate, Modifier};
use tidecast_logic::progression::Progress;
use tidecast_logic::quests::{advance, QuestRequirement};
use tidecast_logic::session::{decode_candidate, encode_candidate, FishingSession};
use tidecast_logic::store::{AnglerState, BaitUse, CatchEvent, CatchRecord, FishingStore, QuestHook};

use crate::tables::*;

pub struct PlayerLedger<'a> {
    pub ctx: &'a ReducerContext,
    pub owner: Identity,
}

impl<'a> PlayerLedger<'a> {
    pub fn new(ctx: &'a ReducerContext) -> Self {
        Self {
            ctx,
            owner: ctx.sender,
        }
    }

    fn inventory_row(&self, item_id: &str) -> Option<InventoryItem> {
        self.ctx
            .db
            .inventory_item()
            .iter()
            .find(|i| i.owner == self.owner && i.item_id == item_id)
    }

    fn clear_bait_slot(&self) {
        if let Some(mut equipment) = self.ctx.db.equipment().owner().find(self.owner) {
            equipment.bait = None;
            self.ctx.db.equipment().owner().update(equipment);
        }
    }
}

impl FishingStore for PlayerLedger<'_> {
    fn angler(&self) -> Result<AnglerState, FishingError> {
        let angler = self
            .ctx
            .db
            .angler()
            .identity()
            .find(self.owner)
            .ok_or(FishingError::UnknownAngler)?;
        Ok(AnglerState {
            zone: angler.zone,
            progress: Progress {
                total_xp: angler.total_xp,
                level: angler.level,
            },
        })
    }

    fn equipped_gear(&self) -> EquippedGear {
        self.ctx
            .db
            .equipment()
            .owner()
            .find(self.owner)
            .map(|e| EquippedGear {
                rod: e.rod,
                hook: e.hook,
                bait: e.bait,
            })
            .unwrap_or_default()
    }

    fn load_session(&self) -> Result<Option<FishingSession>, FishingError> {
        let Some(row) = self.ctx.db.fishing_session().owner().find(self.owner) else {
            return Ok(None);
        };
        let candidate = match decode_candidate(&row.candidate_json) {
            Ok(candidate) => candidate,
            Err(err) => {
                log::error!("Dropping unreadable session for {:?}: {}", self.owner, err);
                self.ctx.db.fishing_session().owner().delete(self.owner);
                return Err(err.into());
            }
        };
        Ok(Some(FishingSession {
            version: row.version,
            candidate,
            started_ms: row.started_ms,
            bite_delay_ms: row.bite_delay_ms,
            bite_time_ms: row.bite_time_ms,
        }))
    }

    fn save_session(&mut self, session: &FishingSession) -> Result<(), FishingError> {
        let row = FishingSessionRow {
            owner: self.owner,
            version: session.version,
            candidate_json: encode_candidate(&session.candidate)?,
            species: session.candidate.species.clone(),
            rarity: session.candidate.rarity.id(),
            started_ms: session.started_ms,
            bite_delay_ms: session.bite_delay_ms,
            bite_time_ms: session.bite_time_ms,
        };
        if self.ctx.db.fishing_session().owner().find(self.owner).is_some() {
            self.ctx.db.fishing_session().owner().update(row);
        } else {
            self.ctx.db.fishing_session().insert(row);
        }
        Ok(())
    }

    fn delete_session(&mut self) {
        self.ctx.db.fishing_session().owner().delete(self.owner);
    }

    fn next_session_version(&mut self) -> u64 {
        let Some(mut angler) = self.ctx.db.angler().identity().find(self.owner) else {
            return 0;
        };
        angler.session_counter += 1;
        let version = angler.session_counter;
        self.ctx.db.angler().identity().update(angler);
        version
    }

    fn consume_bait(&mut self) -> BaitUse {
        let Some(bait_id) = self.equipped_gear().bait else {
            return BaitUse::NoneEquipped;
        };
        match self.inventory_row(&bait_id) {
            Some(mut item) if item.quantity > 1 => {
                item.quantity -= 1;
                let remaining = item.quantity;
                self.ctx.db.inventory_item().id().update(item);
                BaitUse::Consumed { remaining }
            }
            Some(item) => {
                self.ctx.db.inventory_item().id().delete(item.id);
                self.clear_bait_slot();
                log::info!("{:?} used their last {}", self.owner, bait_id);
                BaitUse::Exhausted
            }
            None => {
                self.clear_bait_slot();
                BaitUse::Exhausted
            }
        }
    }

    fn record_catch(&mut self, item: &CatchCandidate, now_ms: i64) -> CatchRecord {
        let modifier = Modifier::id_of(item.modifier);
        let rarity = item.rarity.id();
        let existing = self.ctx.db.catch_stack().iter().find(|s| {
            s.owner == self.owner
                && s.species == item.species
                && s.rarity == rarity
                && s.modifier == modifier
        });
        let stack_count = match existing {
            Some(mut stack) => {
                stack.count += 1;
                stack.last_caught_ms = now_ms;
                let count = stack.count;
                self.ctx.db.catch_stack().id().update(stack);
                count
            }
            None => {
                self.ctx.db.catch_stack().insert(CatchStack {
                    id: 0,
                    owner: self.owner,
                    species: item.species.clone(),
                    kind: item.kind.id(),
                    rarity,
                    modifier,
                    count: 1,
                    last_caught_ms: now_ms,
                });
                1
            }
        };

        let new_biggest = match item.weight {
            Some(weight) => {
                let record = BiggestCatch {
                    species: item.species.clone(),
                    holder: self.owner,
                    weight,
                    length: item.length.unwrap_or(0.0),
                    caught_ms: now_ms,
                };
                match self.ctx.db.biggest_catch().species().find(&item.species) {
                    Some(best) if best.weight >= weight => false,
                    Some(_) => {
                        self.ctx.db.biggest_catch().species().update(record);
                        true
                    }
                    None => {
                        self.ctx.db.biggest_catch().insert(record);
                        true
                    }
                }
            }
            None => false,
        };

        CatchRecord {
            stack_count,
            new_biggest,
        }
    }

    fn save_progress(&mut self, progress: Progress) {
        if let Some(mut angler) = self.ctx.db.angler().identity().find(self.owner) {
            angler.total_xp = progress.total_xp;
            angler.level = progress.level;
            self.ctx.db.angler().identity().update(angler);
        }
    }
}

/// Quest log of one angler.
pub struct QuestBoard<'a> {
    pub ctx: &'a ReducerContext,
    pub owner: Identity,
}

fn requirement_of(objective: &QuestObjective) -> QuestRequirement {
    QuestRequirement {
        species: objective.species.clone(),
        kind: objective.kind.and_then(CatchKind::from_id),
        min_rarity: objective.min_rarity.and_then(Rarity::from_id),
        zone: objective.zone.clone(),
        requires_rain: objective.requires_rain,
        requires_night: objective.requires_night,
    }
}

impl QuestHook for QuestBoard<'_> {
    fn on_catch(&mut self, event: &CatchEvent<'_>) -> u32 {
        let open: Vec<QuestObjective> = self
            .ctx
            .db
            .quest_objective()
            .iter()
            .filter(|q| q.owner == self.owner && !q.completed)
            .filter(|q| requirement_of(q).matches(event))
            .collect();
        let advanced = open.len() as u32;
        for mut objective in open {
            let (progress, completed) = advance(objective.progress, objective.required);
            objective.progress = progress;
            objective.completed = completed;
            if completed {
                log::info!("{:?} completed quest {}", self.owner, objective.quest_id);
            }
            self.ctx.db.quest_objective().id().update(objective);
        }
        advanced
    }
}
