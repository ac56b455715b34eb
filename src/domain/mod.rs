//! Domain layer - the conversational core.
//!
//! Pure business logic: dialogue state management, entity normalization,
//! and offer ranking. The only outward dependency is the city resolver
//! port the dialogue manager consults; everything else is deterministic
//! and free of I/O.

pub mod dialogue;
pub mod foundation;
pub mod nlu;
pub mod ranking;
