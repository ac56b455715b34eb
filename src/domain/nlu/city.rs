//! City reference values and acceptance rules.
//!
//! The actual text-to-city matching lives behind the `CityResolver` port;
//! this module owns the resolved value shape and the confidence rules that
//! decide whether a resolver match is trustworthy enough to fill a slot.

use serde::{Deserialize, Serialize};

/// How the resolver arrived at a city match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CityMatchType {
    /// Input equals the canonical city name.
    Exact,
    /// Input equals a known alias or nickname.
    Alias,
    /// Input equals the IATA airport code.
    AirportCode,
    /// Input is a close-but-inexact string match.
    Fuzzy,
}

/// A resolved city reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityRef {
    /// Canonical IATA code, e.g. "BOM".
    pub code: String,
    /// Canonical city name, e.g. "mumbai".
    pub canonical_name: String,
    /// Resolver confidence in [0, 1].
    pub confidence: f64,
    /// How the match was made.
    pub match_type: CityMatchType,
}

impl CityRef {
    /// Creates a city reference with full confidence.
    pub fn new(
        code: impl Into<String>,
        canonical_name: impl Into<String>,
        match_type: CityMatchType,
    ) -> Self {
        Self {
            code: code.into(),
            canonical_name: canonical_name.into(),
            confidence: 1.0,
            match_type,
        }
    }

    /// Sets the resolver confidence.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence.clamp(0.0, 1.0);
        self
    }
}

/// Acceptance rules applied to resolver output before a match may fill
/// a dialogue slot.
#[derive(Debug, Clone)]
pub struct CityRules {
    /// Minimum similarity for accepting a fuzzy match.
    pub fuzzy_threshold: f64,
}

impl CityRules {
    pub fn new(fuzzy_threshold: f64) -> Self {
        Self { fuzzy_threshold }
    }

    /// Accepts or rejects a resolver match.
    ///
    /// Exact, alias, and airport-code matches pass unconditionally; fuzzy
    /// matches pass only at or above the similarity threshold. A rejected
    /// match returns `None` - the dialogue never guesses.
    pub fn accept(&self, candidate: CityRef) -> Option<CityRef> {
        match candidate.match_type {
            CityMatchType::Exact | CityMatchType::Alias | CityMatchType::AirportCode => {
                Some(candidate)
            }
            CityMatchType::Fuzzy if candidate.confidence >= self.fuzzy_threshold => Some(candidate),
            CityMatchType::Fuzzy => None,
        }
    }
}

impl Default for CityRules {
    fn default() -> Self {
        Self::new(0.7)
    }
}
