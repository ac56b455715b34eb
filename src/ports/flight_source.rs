//! Flight inventory port.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::nlu::CityRef;
use crate::domain::ranking::FlightOffer;

/// Why a flight data source failed to answer.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("flight source unavailable: {0}")]
    Unavailable(String),

    #[error("flight source timed out")]
    Timeout,

    #[error("flight source returned malformed data: {0}")]
    Malformed(String),
}

/// Supplies raw flight offers for a route and date.
///
/// Implementations return unranked offers; scoring and ordering belong to
/// the ranking engine. A failure here is never fatal to the turn - the
/// application layer falls back to the synthetic source.
#[async_trait]
pub trait FlightDataSource: Send + Sync {
    /// Source name, for trace logs.
    fn name(&self) -> &'static str;

    async fn search(
        &self,
        origin: &CityRef,
        destination: &CityRef,
        date: NaiveDate,
        max_results: usize,
    ) -> Result<Vec<FlightOffer>, SourceError>;
}
