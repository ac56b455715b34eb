//! Sub-score computation and ranking configuration.
//!
//! Four normalized sub-scores per offer (price, duration, convenience,
//! reliability), combined into a composite by a preference-selected weight
//! vector. The band constants and carrier set are injected configuration,
//! not module globals, so tests can substitute fixtures.

use serde::Deserialize;

use super::FlightOffer;
use crate::domain::nlu::Preference;

/// Weight vector applied to the four sub-scores.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ScoreWeights {
    pub price: f64,
    pub duration: f64,
    pub convenience: f64,
    pub reliability: f64,
}

impl ScoreWeights {
    pub const fn new(price: f64, duration: f64, convenience: f64, reliability: f64) -> Self {
        Self { price, duration, convenience, reliability }
    }
}

/// Immutable configuration for the ranking engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Fare at or below which the price score saturates at 1.
    pub price_floor: f64,
    /// Fare at or above which the price score is 0.
    pub price_ceiling: f64,
    /// Duration at or below which the duration score saturates at 1.
    pub duration_floor_minutes: f64,
    /// Duration at or above which the duration score is 0.
    pub duration_ceiling_minutes: f64,
    /// Carrier codes granted the reliability bonus.
    pub major_carriers: Vec<String>,
    /// Weights when the traveler optimizes for price.
    pub price_weights: ScoreWeights,
    /// Weights when the traveler optimizes for time.
    pub time_weights: ScoreWeights,
    /// Weights when the traveler optimizes for convenience.
    pub convenience_weights: ScoreWeights,
    /// Weights when no preference was given.
    pub balanced_weights: ScoreWeights,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            price_floor: 2_000.0,
            price_ceiling: 50_000.0,
            duration_floor_minutes: 60.0,
            duration_ceiling_minutes: 480.0,
            major_carriers: vec!["AI".into(), "6E".into(), "UK".into()],
            price_weights: ScoreWeights::new(0.6, 0.2, 0.1, 0.1),
            time_weights: ScoreWeights::new(0.2, 0.6, 0.1, 0.1),
            convenience_weights: ScoreWeights::new(0.15, 0.15, 0.5, 0.2),
            balanced_weights: ScoreWeights::new(0.3, 0.3, 0.2, 0.2),
        }
    }
}

impl RankingConfig {
    /// Selects the weight vector for a preference; balanced when absent.
    pub fn weights_for(&self, preference: Option<Preference>) -> ScoreWeights {
        match preference {
            Some(Preference::Price) => self.price_weights,
            Some(Preference::Time) => self.time_weights,
            Some(Preference::Convenience) => self.convenience_weights,
            None => self.balanced_weights,
        }
    }

    /// Checks band and weight sanity, returning the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        if self.price_floor >= self.price_ceiling {
            return Err("price_floor must be below price_ceiling".into());
        }
        if self.duration_floor_minutes >= self.duration_ceiling_minutes {
            return Err("duration_floor_minutes must be below duration_ceiling_minutes".into());
        }
        for (name, w) in [
            ("price_weights", self.price_weights),
            ("time_weights", self.time_weights),
            ("convenience_weights", self.convenience_weights),
            ("balanced_weights", self.balanced_weights),
        ] {
            let parts = [w.price, w.duration, w.convenience, w.reliability];
            if parts.iter().any(|p| *p < 0.0) {
                return Err(format!("{} must be nonnegative", name));
            }
            if parts.iter().sum::<f64>() <= 0.0 {
                return Err(format!("{} must have a positive sum", name));
            }
        }
        Ok(())
    }

    fn is_major_carrier(&self, code: &str) -> bool {
        self.major_carriers.iter().any(|c| c == code)
    }
}

/// The four normalized sub-scores of one offer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubScores {
    pub price: f64,
    pub duration: f64,
    pub convenience: f64,
    pub reliability: f64,
}

impl SubScores {
    /// Computes all four sub-scores for an offer, each clamped to [0, 1].
    pub fn compute(offer: &FlightOffer, config: &RankingConfig) -> Self {
        Self {
            price: band_score(offer.price, config.price_floor, config.price_ceiling),
            duration: band_score(
                offer.duration_minutes as f64,
                config.duration_floor_minutes,
                config.duration_ceiling_minutes,
            ),
            convenience: convenience_score(offer),
            reliability: reliability_score(offer, config),
        }
    }

    /// Weighted sum of the sub-scores.
    pub fn composite(&self, weights: ScoreWeights) -> f64 {
        self.price * weights.price
            + self.duration * weights.duration
            + self.convenience * weights.convenience
            + self.reliability * weights.reliability
    }
}

/// Linear score over a [floor, ceiling] band: 1 at or below the floor,
/// 0 at or above the ceiling.
fn band_score(value: f64, floor: f64, ceiling: f64) -> f64 {
    if ceiling <= floor {
        return 0.0;
    }
    ((ceiling - value) / (ceiling - floor)).clamp(0.0, 1.0)
}

fn convenience_score(offer: &FlightOffer) -> f64 {
    let mut score: f64 = 0.5;
    match offer.stops {
        0 => score += 0.3,
        1 => score += 0.1,
        _ => {}
    }
    if let Some(hour) = offer.departure_hour() {
        if (6..10).contains(&hour) {
            score += 0.2;
        } else if (17..21).contains(&hour) {
            score += 0.1;
        }
    }
    score.min(1.0)
}

fn reliability_score(offer: &FlightOffer, config: &RankingConfig) -> f64 {
    let mut score: f64 = 0.5;
    if config.is_major_carrier(&offer.carrier_code) {
        score += 0.3;
    }
    if offer.is_nonstop() {
        score += 0.2;
    }
    score.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(price: f64, duration: i64, stops: u32, carrier: &str, hour: u32) -> FlightOffer {
        FlightOffer {
            id: format!("{}-1", carrier),
            carrier_code: carrier.into(),
            price,
            currency: "INR".into(),
            departure_iso: format!("2025-12-25T{:02}:00:00", hour),
            arrival_iso: "2025-12-25T23:59:00".into(),
            duration_minutes: duration,
            stops,
        }
    }

    mod band_scores {
        use super::*;

        #[test]
        fn price_at_ceiling_scores_zero() {
            let s = SubScores::compute(&offer(50_000.0, 120, 0, "AI", 8), &RankingConfig::default());
            assert_eq!(s.price, 0.0);
        }

        #[test]
        fn price_above_ceiling_is_clamped_to_zero() {
            let s = SubScores::compute(&offer(90_000.0, 120, 0, "AI", 8), &RankingConfig::default());
            assert_eq!(s.price, 0.0);
        }

        #[test]
        fn price_at_floor_scores_one() {
            let s = SubScores::compute(&offer(2_000.0, 120, 0, "AI", 8), &RankingConfig::default());
            assert_eq!(s.price, 1.0);
        }

        #[test]
        fn mid_band_price_is_linear() {
            // Midpoint of the 2000..50000 band.
            let s = SubScores::compute(&offer(26_000.0, 120, 0, "AI", 8), &RankingConfig::default());
            assert!((s.price - 0.5).abs() < 1e-9);
        }

        #[test]
        fn duration_at_ceiling_scores_zero() {
            let s = SubScores::compute(&offer(5_000.0, 480, 0, "AI", 8), &RankingConfig::default());
            assert_eq!(s.duration, 0.0);
        }

        #[test]
        fn degenerate_band_scores_zero() {
            assert_eq!(band_score(100.0, 50.0, 50.0), 0.0);
        }
    }

    mod convenience {
        use super::*;

        #[test]
        fn nonstop_morning_departure_is_capped_at_one() {
            // 0.5 base + 0.3 nonstop + 0.2 morning = 1.0
            let s = SubScores::compute(&offer(5_000.0, 120, 0, "AI", 8), &RankingConfig::default());
            assert_eq!(s.convenience, 1.0);
        }

        #[test]
        fn one_stop_evening_departure() {
            // 0.5 + 0.1 one stop + 0.1 evening
            let s = SubScores::compute(&offer(5_000.0, 120, 1, "AI", 18), &RankingConfig::default());
            assert!((s.convenience - 0.7).abs() < 1e-9);
        }

        #[test]
        fn two_stops_midday_gets_base_only() {
            let s = SubScores::compute(&offer(5_000.0, 120, 2, "AI", 13), &RankingConfig::default());
            assert!((s.convenience - 0.5).abs() < 1e-9);
        }

        #[test]
        fn hour_window_boundaries_are_half_open() {
            let at_ten = SubScores::compute(&offer(5_000.0, 120, 2, "AI", 10), &RankingConfig::default());
            assert!((at_ten.convenience - 0.5).abs() < 1e-9);
            let at_six = SubScores::compute(&offer(5_000.0, 120, 2, "AI", 6), &RankingConfig::default());
            assert!((at_six.convenience - 0.7).abs() < 1e-9);
        }
    }

    mod reliability {
        use super::*;

        #[test]
        fn major_carrier_nonstop_is_capped() {
            let s = SubScores::compute(&offer(5_000.0, 120, 0, "AI", 13), &RankingConfig::default());
            assert_eq!(s.reliability, 1.0);
        }

        #[test]
        fn unknown_carrier_with_stops_gets_base() {
            let s = SubScores::compute(&offer(5_000.0, 120, 2, "ZZ", 13), &RankingConfig::default());
            assert!((s.reliability - 0.5).abs() < 1e-9);
        }

        #[test]
        fn carrier_set_is_injected_configuration() {
            let config = RankingConfig {
                major_carriers: vec!["ZZ".into()],
                ..RankingConfig::default()
            };
            let s = SubScores::compute(&offer(5_000.0, 120, 2, "ZZ", 13), &config);
            assert!((s.reliability - 0.8).abs() < 1e-9);
        }
    }

    mod weights {
        use super::*;

        #[test]
        fn preference_selects_weight_vector() {
            let config = RankingConfig::default();
            assert_eq!(config.weights_for(Some(Preference::Price)), config.price_weights);
            assert_eq!(config.weights_for(Some(Preference::Time)), config.time_weights);
            assert_eq!(
                config.weights_for(Some(Preference::Convenience)),
                config.convenience_weights
            );
            assert_eq!(config.weights_for(None), config.balanced_weights);
        }

        #[test]
        fn composite_is_the_weighted_sum() {
            let sub = SubScores { price: 1.0, duration: 0.5, convenience: 0.0, reliability: 1.0 };
            let w = ScoreWeights::new(0.4, 0.2, 0.2, 0.2);
            assert!((sub.composite(w) - 0.7).abs() < 1e-9);
        }
    }
}
