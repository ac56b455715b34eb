//! Flight offer ranking.
//!
//! A pure, deterministic engine: given candidate offers and a traveler
//! preference it produces a fully ordered list plus three named category
//! picks (Cheapest, Shortest, MostConvenient). No I/O, no clock, no
//! randomness - identical inputs always produce identical output.

mod engine;
mod offer;
mod score;

pub use engine::{rank, RankingOutcome};
pub use offer::{Badge, Category, FlightOffer, RankedFlight};
pub use score::{RankingConfig, ScoreWeights, SubScores};
