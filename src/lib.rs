//! War Forge - deterministic, event-sourced War card game engine
//!
//! The engine resolves one round at a time from a game state and a seeded
//! random source, emitting an ordered event log. Traces of those events can
//! be recorded, replayed and verified against a fresh simulation.

pub mod core;
pub mod error;
pub mod game;
pub mod playback;
pub mod simulate;
pub mod trace;

pub use error::{Result, WarError};
