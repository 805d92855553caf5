//! Tidecast Server - SpacetimeDB Module
//!
//! Persistence and the two fishing endpoints. Game rules live in
//! `tidecast-logic`; reducers here only move rows in and out of it.
//! The tug simulation runs on the client and is never replayed here.

mod ledger;
mod reducers;
mod tables;

pub use reducers::*;
pub use tables::*;
