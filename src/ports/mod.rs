//! Ports (interfaces) for external dependencies.
//!
//! The domain and application layers depend only on these traits; the
//! adapters module provides the implementations. Swapping a live flight
//! inventory for the synthetic one, or an external session store for the
//! in-memory one, never touches dialogue or ranking code.

pub mod city_resolver;
pub mod flight_source;
pub mod session_store;

pub use city_resolver::CityResolver;
pub use flight_source::{FlightDataSource, SourceError};
pub use session_store::SessionStore;
