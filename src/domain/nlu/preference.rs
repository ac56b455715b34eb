//! Travel preference parsing.
//!
//! A closed preference enum plus the fixed synonym sets that map free-text
//! tokens onto it. Parsing is word-based so "cheapest flight please" and
//! "something direct" both resolve.

use serde::{Deserialize, Serialize};

/// What the traveler optimizes for. Drives the ranking weight table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preference {
    /// Lowest fare wins.
    Price,
    /// Shortest journey wins.
    Time,
    /// Nonstop and friendly departure hours win.
    Convenience,
}

const PRICE_SYNONYMS: &[&str] = &["price", "cheap", "cheaper", "cheapest", "budget", "lowest", "affordable"];
const TIME_SYNONYMS: &[&str] = &["time", "fast", "faster", "fastest", "quick", "quickest", "earliest", "shortest"];
const CONVENIENCE_SYNONYMS: &[&str] = &["convenience", "convenient", "comfortable", "comfort", "direct", "nonstop"];

impl Preference {
    /// Parses a preference from free text via the fixed synonym sets.
    ///
    /// Matches whole words only; returns `None` when no synonym appears,
    /// which keeps the dialogue in the preference-collecting step.
    pub fn parse(text: &str) -> Option<Self> {
        let lowered = text.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        for word in words {
            if PRICE_SYNONYMS.contains(&word) {
                return Some(Preference::Price);
            }
            if TIME_SYNONYMS.contains(&word) {
                return Some(Preference::Time);
            }
            if CONVENIENCE_SYNONYMS.contains(&word) {
                return Some(Preference::Convenience);
            }
        }
        None
    }

    /// Human-readable label for prompts.
    pub fn label(&self) -> &'static str {
        match self {
            Preference::Price => "best price",
            Preference::Time => "shortest time",
            Preference::Convenience => "most convenient",
        }
    }
}
