//! Dialogue slots.

use serde::{Deserialize, Serialize};

/// A single piece of information the dialogue collects, in the order the
/// dialogue asks for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Origin,
    Destination,
    Date,
    Preference,
}

impl Slot {
    /// Collection order: origin, destination, date, preference.
    pub const ALL: [Slot; 4] = [Slot::Origin, Slot::Destination, Slot::Date, Slot::Preference];
}
