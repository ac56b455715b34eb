//! Deterministic synthetic flight inventory.
//!
//! Serves as both the default data source and the fallback when a live
//! source fails: offers are generated from a seed derived from the route
//! and date, so the same query always yields the same inventory and tests
//! never flake.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::nlu::CityRef;
use crate::domain::ranking::FlightOffer;
use crate::ports::{FlightDataSource, SourceError};

const CARRIERS: &[&str] = &["AI", "6E", "UK", "SG", "QP", "G8"];

/// Flight source that fabricates plausible offers.
#[derive(Debug, Default)]
pub struct SyntheticFlightSource;

impl SyntheticFlightSource {
    pub fn new() -> Self {
        Self
    }

    /// Generates offers for a route and date. Deterministic: the seed is
    /// a hash of (origin, destination, date).
    pub fn generate(
        origin: &CityRef,
        destination: &CityRef,
        date: NaiveDate,
        max_results: usize,
    ) -> Vec<FlightOffer> {
        let mut hasher = DefaultHasher::new();
        origin.code.hash(&mut hasher);
        destination.code.hash(&mut hasher);
        date.hash(&mut hasher);
        let mut rng = StdRng::seed_from_u64(hasher.finish());

        let count = rng.gen_range(6..=10).min(max_results);
        (0..count)
            .map(|_| {
                let carrier = CARRIERS[rng.gen_range(0..CARRIERS.len())];
                let flight_number = rng.gen_range(100..1000);
                let price = (rng.gen_range(2500.0..15000.0_f64) / 50.0).round() * 50.0;
                let duration_minutes: i64 = rng.gen_range(75..=420);
                let stops: u32 = rng.gen_range(0..3);

                let hour = rng.gen_range(5..22);
                let minute = [0u32, 15, 30, 45][rng.gen_range(0..4)];
                // Hour and minute are always in range.
                let departure = date
                    .and_hms_opt(hour, minute, 0)
                    .unwrap_or_else(|| date.and_time(chrono::NaiveTime::default()));
                let arrival = departure + Duration::minutes(duration_minutes);

                FlightOffer {
                    id: format!("{}-{}", carrier, flight_number),
                    carrier_code: carrier.to_string(),
                    price,
                    currency: "INR".to_string(),
                    departure_iso: departure.format("%Y-%m-%dT%H:%M:%S").to_string(),
                    arrival_iso: arrival.format("%Y-%m-%dT%H:%M:%S").to_string(),
                    duration_minutes,
                    stops,
                }
            })
            .collect()
    }
}

#[async_trait]
impl FlightDataSource for SyntheticFlightSource {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    async fn search(
        &self,
        origin: &CityRef,
        destination: &CityRef,
        date: NaiveDate,
        max_results: usize,
    ) -> Result<Vec<FlightOffer>, SourceError> {
        Ok(Self::generate(origin, destination, date, max_results))
    }
}
