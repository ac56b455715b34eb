//! Slot-filling dialogue management.
//!
//! The dialogue manager owns per-session slot collection: a finite-state
//! machine over collection steps, a date-confirmation sub-flow for inferred
//! dates, a fast path for single-utterance queries, and idempotent
//! re-prompting on bad input. Context values are immutable; every turn
//! produces a new context rather than mutating the old one.

mod context;
mod fast_path;
mod manager;
pub mod prompts;
mod slot;
mod step;

pub use context::{DateCandidate, SessionContext};
pub use fast_path::{match_route, matcher_cascade, RouteUtterance, UtteranceMatcher};
pub use manager::{DialogueManager, TurnAction, TurnDecision};
pub use prompts::Reply;
pub use slot::Slot;
pub use step::DialogueStep;
