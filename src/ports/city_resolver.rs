//! City resolution port.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::nlu::CityRef;

/// Resolves free-text city mentions to canonical airport cities.
///
/// `resolve` returns the single best match or `None`; acceptance of fuzzy
/// matches against the confidence threshold is the caller's decision, so
/// implementations report every candidate they find with its confidence.
#[async_trait]
pub trait CityResolver: Send + Sync {
    /// Best match for the given text, if any.
    async fn resolve(&self, raw: &str) -> Result<Option<CityRef>, DomainError>;

    /// Up to `limit` canonical city names similar to the given text,
    /// closest first.
    async fn suggestions(&self, raw: &str, limit: usize) -> Result<Vec<String>, DomainError>;
}
