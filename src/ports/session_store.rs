//! Session persistence port.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::dialogue::SessionContext;
use crate::domain::foundation::{DomainError, SessionId};

/// Stores one dialogue context per session with a sliding TTL.
///
/// `get` returns `None` for both unknown and expired sessions; the caller
/// starts a fresh context either way. An unreadable stored value surfaces
/// as a `CorruptContext` domain error rather than `None`, so the caller
/// can log the recovery.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, id: &SessionId) -> Result<Option<SessionContext>, DomainError>;

    async fn set(
        &self,
        id: &SessionId,
        context: &SessionContext,
        ttl: Duration,
    ) -> Result<(), DomainError>;

    async fn remove(&self, id: &SessionId) -> Result<(), DomainError>;
}
