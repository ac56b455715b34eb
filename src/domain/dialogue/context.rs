//! Immutable session context.
//!
//! One context value per session per turn: every mutation helper returns a
//! new value, so concurrent reasoning and test replay stay simple. The
//! whole shape is flat JSON with ISO-8601 date strings - no native date
//! objects and no cycles - so it round-trips losslessly through the
//! session store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{DialogueStep, Slot};
use crate::domain::nlu::{CityRef, Preference};
use crate::domain::ranking::RankedFlight;

/// An inferred date awaiting user confirmation.
///
/// Exists only while the dialogue sits in `DateConfirmation`; every
/// terminal resolution of the sub-flow (accept, reject, override) clears
/// it, so it can never leak into another session's turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateCandidate {
    /// The user's original text, e.g. "25th".
    pub raw_input: String,
    /// The date the parser inferred from it.
    pub inferred_iso: NaiveDate,
    /// Alternative dates offered alongside, at most four.
    pub alternatives: Vec<NaiveDate>,
}

/// Per-session dialogue state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SessionContext {
    pub step: DialogueStep,
    pub origin: Option<CityRef>,
    pub destination: Option<CityRef>,
    pub date: Option<NaiveDate>,
    pub preference: Option<Preference>,
    pub pending_confirmation: Option<DateCandidate>,
    pub last_flights: Option<Vec<RankedFlight>>,
}

impl SessionContext {
    /// A fresh context at the initial step.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy at a different step.
    pub fn with_step(&self, step: DialogueStep) -> Self {
        Self { step, ..self.clone() }
    }

    /// Returns a copy with the origin filled.
    pub fn with_origin(&self, origin: CityRef) -> Self {
        Self { origin: Some(origin), ..self.clone() }
    }

    /// Returns a copy with the destination filled.
    pub fn with_destination(&self, destination: CityRef) -> Self {
        Self { destination: Some(destination), ..self.clone() }
    }

    /// Returns a copy with the travel date filled.
    pub fn with_date(&self, date: NaiveDate) -> Self {
        Self { date: Some(date), ..self.clone() }
    }

    /// Returns a copy with the preference filled.
    pub fn with_preference(&self, preference: Preference) -> Self {
        Self { preference: Some(preference), ..self.clone() }
    }

    /// Returns a copy carrying a pending date confirmation.
    pub fn with_pending_confirmation(&self, candidate: DateCandidate) -> Self {
        Self { pending_confirmation: Some(candidate), ..self.clone() }
    }

    /// Returns a copy with the confirmation sub-flow resolved.
    pub fn without_pending_confirmation(&self) -> Self {
        Self { pending_confirmation: None, ..self.clone() }
    }

    /// Returns a copy with the given slot reset to unfilled.
    pub fn with_slot_cleared(&self, slot: Slot) -> Self {
        let mut next = self.clone();
        match slot {
            Slot::Origin => next.origin = None,
            Slot::Destination => next.destination = None,
            Slot::Date => {
                next.date = None;
                next.pending_confirmation = None;
            }
            Slot::Preference => next.preference = None,
        }
        next
    }

    /// Returns a copy with all slots and results cleared, ready for a new
    /// search.
    pub fn reset(&self) -> Self {
        Self::new()
    }

    /// Returns a copy with ranked results attached.
    pub fn with_last_flights(&self, flights: Vec<RankedFlight>) -> Self {
        Self { last_flights: Some(flights), ..self.clone() }
    }

    /// Whether a slot has been resolved.
    pub fn is_filled(&self, slot: Slot) -> bool {
        match slot {
            Slot::Origin => self.origin.is_some(),
            Slot::Destination => self.destination.is_some(),
            Slot::Date => self.date.is_some(),
            Slot::Preference => self.preference.is_some(),
        }
    }

    /// First slot in collection order that is still unfilled.
    pub fn first_unresolved_slot(&self) -> Option<Slot> {
        Slot::ALL.into_iter().find(|slot| !self.is_filled(*slot))
    }

    /// True when every slot needed to search is resolved.
    pub fn ready_to_search(&self) -> bool {
        self.first_unresolved_slot().is_none() && self.pending_confirmation.is_none()
    }

    /// Repairs a context whose step disagrees with its slots.
    ///
    /// A partially written or stale context is fatal only to its step: all
    /// resolved slots are kept and the step falls back to the first
    /// unresolved slot. A pending confirmation outside the confirmation
    /// step is dropped.
    pub fn reconciled(&self) -> Self {
        let mut next = self.clone();

        if next.pending_confirmation.is_some() && next.step != DialogueStep::DateConfirmation {
            next.pending_confirmation = None;
        }
        if next.step == DialogueStep::DateConfirmation && next.pending_confirmation.is_none() {
            next.step = DialogueStep::Collecting(Slot::Date);
            next.date = None;
        }

        match next.step {
            DialogueStep::Collecting(slot) if next.is_filled(slot) => {
                next.step = match next.first_unresolved_slot() {
                    Some(unresolved) => DialogueStep::Collecting(unresolved),
                    None => next.step,
                };
            }
            DialogueStep::Initial if next.origin.is_some() => {
                if let Some(unresolved) = next.first_unresolved_slot() {
                    next.step = DialogueStep::Collecting(unresolved);
                }
            }
            // A context abandoned mid-search re-collects nothing; the
            // application layer re-runs the search from its slots.
            _ => {}
        }

        next
    }
}
