//! Dialogue step state machine.
//!
//! The step enum is closed so every handler match is exhaustive, and the
//! `StateMachine` impl is the single source of truth for legal
//! progression. Re-prompting on bad input is a non-transition: the step
//! stays where it is.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::Slot;
use crate::domain::foundation::StateMachine;

/// Where the dialogue currently is.
///
/// The happy path runs `Initial` through the four collecting steps to
/// `Searching` and `Complete`; `DateConfirmation` interposes when a date
/// was inferred from partial input. `Searching` is never user-visible as
/// a separate turn - the application layer resolves it within the same
/// turn that entered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DialogueStep {
    #[default]
    Initial,
    Collecting(Slot),
    DateConfirmation,
    Searching,
    Complete,
}

impl DialogueStep {
    /// Stable string form used in the persisted context.
    pub fn as_str(&self) -> &'static str {
        match self {
            DialogueStep::Initial => "initial",
            DialogueStep::Collecting(Slot::Origin) => "collecting_origin",
            DialogueStep::Collecting(Slot::Destination) => "collecting_destination",
            DialogueStep::Collecting(Slot::Date) => "collecting_date",
            DialogueStep::Collecting(Slot::Preference) => "collecting_preference",
            DialogueStep::DateConfirmation => "date_confirmation",
            DialogueStep::Searching => "searching",
            DialogueStep::Complete => "complete",
        }
    }

    fn from_str(s: &str) -> Option<Self> {
        let step = match s {
            "initial" => DialogueStep::Initial,
            "collecting_origin" => DialogueStep::Collecting(Slot::Origin),
            "collecting_destination" => DialogueStep::Collecting(Slot::Destination),
            "collecting_date" => DialogueStep::Collecting(Slot::Date),
            "collecting_preference" => DialogueStep::Collecting(Slot::Preference),
            "date_confirmation" => DialogueStep::DateConfirmation,
            "searching" => DialogueStep::Searching,
            "complete" => DialogueStep::Complete,
            _ => return None,
        };
        Some(step)
    }

}

impl Serialize for DialogueStep {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DialogueStep {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        DialogueStep::from_str(&s)
            .ok_or_else(|| D::Error::custom(format!("unknown dialogue step '{}'", s)))
    }
}

impl StateMachine for DialogueStep {
    fn can_transition_to(&self, target: &Self) -> bool {
        use DialogueStep::*;
        match (self, target) {
            // The fast path can jump from any gathering step to any later
            // gathering step, into confirmation, or straight to searching.
            (Initial, Collecting(_)) | (Initial, DateConfirmation) | (Initial, Searching) => true,
            (Collecting(_), DateConfirmation) | (Collecting(_), Searching) => true,
            (Collecting(a), Collecting(b)) => a != b,
            // Confirmation resolves back to date collection (rejected),
            // forward to preference (accepted), or straight to searching
            // when the preference is already known.
            (DateConfirmation, Collecting(Slot::Date))
            | (DateConfirmation, Collecting(Slot::Preference))
            | (DateConfirmation, Searching) => true,
            (Searching, Complete) => true,
            // "Search again" and slot-change intents re-open collection.
            (Complete, Initial) | (Complete, Collecting(_)) => true,
            _ => false,
        }
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use DialogueStep::*;
        let collecting_all =
            || Slot::ALL.iter().map(|s| Collecting(*s)).collect::<Vec<_>>();
        match self {
            Initial => {
                let mut v = collecting_all();
                v.push(DateConfirmation);
                v.push(Searching);
                v
            }
            Collecting(slot) => {
                let mut v: Vec<_> =
                    Slot::ALL.iter().filter(|s| *s != slot).map(|s| Collecting(*s)).collect();
                v.push(DateConfirmation);
                v.push(Searching);
                v
            }
            DateConfirmation => {
                vec![Collecting(Slot::Date), Collecting(Slot::Preference), Searching]
            }
            Searching => vec![Complete],
            Complete => {
                let mut v = vec![Initial];
                v.extend(collecting_all());
                v
            }
        }
    }
}
