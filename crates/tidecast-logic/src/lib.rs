//! Pure fishing logic for Tidecast.
//!
//! This crate contains all game logic that is independent of any database,
//! engine, or runtime. Functions take plain data (an explicit `now_ms`, an
//! injected random source) and return results, so the same code runs inside
//! the SpacetimeDB module (WASM), the headless harness and the game client.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`bar_layout`] | Red/yellow/green zones along the balance axis, static and moving |
//! | [`cast`] | Cast-power meter and the stamina bonus it grants |
//! | [`catalog`] | Zones, species, resources and gear loaded from JSON |
//! | [`client`] | Client attempt state machine (cast → bite → reaction → tug) |
//! | [`constants`] | Rarity, weather, phase, item-kind and modifier ids (u8) |
//! | [`error`] | Protocol error taxonomy |
//! | [`fish_intent`] | Hold/transition machine for where the fish pulls |
//! | [`gear`] | Equipped rod/hook/bait and the stats they sum to |
//! | [`generator`] | Weather- and luck-weighted catch generation |
//! | [`progression`] | Catch XP and the level curve |
//! | [`protocol`] | `start` and `catch` endpoints over a [`store::FishingStore`] |
//! | [`quests`] | Catch-driven quest objectives and the starter set |
//! | [`session`] | The persisted fishing session and its timing windows |
//! | [`store`] | Persistence seams plus an in-memory store |
//! | [`tug`] | Tick-by-tick tug-of-bar simulation |
//! | [`world_clock`] | Day/night phase and rain as a pure function of time |

pub mod bar_layout;
pub mod cast;
pub mod catalog;
pub mod client;
pub mod constants;
pub mod error;
pub mod fish_intent;
pub mod gear;
pub mod generator;
pub mod progression;
pub mod protocol;
pub mod quests;
pub mod session;
pub mod store;
pub mod tug;
pub mod world_clock;
