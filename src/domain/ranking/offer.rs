//! Flight offer shapes.
//!
//! `FlightOffer` is the schema shared by the real data source and the
//! synthetic fallback; the ranking engine never observes which one
//! produced an offer. Timestamps are ISO-8601 strings so the whole shape
//! round-trips through JSON losslessly.

use serde::{Deserialize, Serialize};

/// A candidate flight offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightOffer {
    /// Offer identifier, e.g. "AI-405".
    pub id: String,
    /// Two-letter IATA carrier code.
    pub carrier_code: String,
    /// Total fare in `currency` units.
    pub price: f64,
    /// ISO-4217 currency code.
    pub currency: String,
    /// Departure timestamp, ISO-8601.
    pub departure_iso: String,
    /// Arrival timestamp, ISO-8601.
    pub arrival_iso: String,
    /// Total journey duration in minutes.
    pub duration_minutes: i64,
    /// Number of intermediate stops; 0 means nonstop.
    pub stops: u32,
}

impl FlightOffer {
    /// True when the offer has no intermediate stops.
    pub fn is_nonstop(&self) -> bool {
        self.stops == 0
    }

    /// Departure hour of day, read from the ISO timestamp.
    ///
    /// Returns `None` for a malformed timestamp rather than failing the
    /// whole ranking pass.
    pub fn departure_hour(&self) -> Option<u32> {
        let time_part = self.departure_iso.split('T').nth(1)?;
        let hour: u32 = time_part.get(0..2)?.parse().ok()?;
        (hour < 24).then_some(hour)
    }
}

/// Named category an offer can be picked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Cheapest,
    Shortest,
    MostConvenient,
}

impl Category {
    /// Display label, identical to the serialized form.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Cheapest => "Cheapest",
            Category::Shortest => "Shortest",
            Category::MostConvenient => "MostConvenient",
        }
    }
}

/// Derived, side-effect-free annotations on a ranked offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    /// Lowest price in the candidate set.
    CheapestInSet,
    /// Shortest duration in the candidate set.
    FastestInSet,
    /// Nonstop flight.
    Direct,
    /// Ranked in the top three by composite score.
    TopPick,
}

/// A flight offer with its ranking annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedFlight {
    #[serde(flatten)]
    pub offer: FlightOffer,
    /// Composite score in [0, 1].
    pub score: f64,
    /// 1-based position in the full ranking.
    pub rank: u32,
    /// Category this offer was picked for, if any.
    pub category: Option<Category>,
    /// Derived annotations.
    pub badges: Vec<Badge>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer() -> FlightOffer {
        FlightOffer {
            id: "AI-101".into(),
            carrier_code: "AI".into(),
            price: 4500.0,
            currency: "INR".into(),
            departure_iso: "2025-12-25T08:30:00".into(),
            arrival_iso: "2025-12-25T10:45:00".into(),
            duration_minutes: 135,
            stops: 0,
        }
    }

    #[test]
    fn departure_hour_reads_iso_timestamp() {
        assert_eq!(offer().departure_hour(), Some(8));
    }

    #[test]
    fn departure_hour_tolerates_malformed_timestamp() {
        let mut o = offer();
        o.departure_iso = "garbage".into();
        assert_eq!(o.departure_hour(), None);
    }

    #[test]
    fn nonstop_means_zero_stops() {
        let mut o = offer();
        assert!(o.is_nonstop());
        o.stops = 1;
        assert!(!o.is_nonstop());
    }

    #[test]
    fn category_serializes_with_exact_labels() {
        assert_eq!(serde_json::to_string(&Category::Cheapest).unwrap(), "\"Cheapest\"");
        assert_eq!(
            serde_json::to_string(&Category::MostConvenient).unwrap(),
            "\"MostConvenient\""
        );
    }

    #[test]
    fn ranked_flight_flattens_offer_fields() {
        let ranked = RankedFlight {
            offer: offer(),
            score: 0.8,
            rank: 1,
            category: Some(Category::Cheapest),
            badges: vec![Badge::Direct],
        };
        let json = serde_json::to_value(&ranked).unwrap();
        assert_eq!(json["carrier_code"], "AI");
        assert_eq!(json["score"], 0.8);
        assert_eq!(json["category"], "Cheapest");
    }
}
