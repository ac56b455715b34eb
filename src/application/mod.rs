//! Application services.
//!
//! Orchestration only: use cases wire the dialogue manager, ranking
//! engine, and ports together. No domain rules live here.

pub mod process_turn;

pub use process_turn::{TurnProcessor, TurnResponse};
