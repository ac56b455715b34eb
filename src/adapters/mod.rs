//! Adapter implementations of the ports.
//!
//! All adapters here are self-contained: a static city directory, a
//! deterministic synthetic flight inventory, and an in-memory session
//! store. Each one implements exactly one port trait.

pub mod directory;
pub mod memory;
pub mod synthetic;

pub use directory::CityDirectory;
pub use memory::InMemorySessionStore;
pub use synthetic::SyntheticFlightSource;
