//! Entity normalization.
//!
//! Rule-based parsing of free-text slot values: travel dates (absolute,
//! relative, partial), preference tokens, and acceptance rules for city
//! matches produced by the external resolver. Nothing here is statistical;
//! every rule is an explicit, ordered pattern.

mod city;
mod date;
mod preference;

pub use city::{CityMatchType, CityRef, CityRules};
pub use date::{confirmation_alternatives, DateParser, ParsedDate};
pub use preference::Preference;
