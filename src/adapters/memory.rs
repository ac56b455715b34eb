//! In-memory session store.
//!
//! Contexts are stored as their JSON form rather than as live values, so
//! the round-trip matches what an external store would do and an
//! unreadable payload surfaces as a corrupt-context error instead of a
//! panic. An expired entry is evicted when its own id is read again, and
//! every write sweeps whatever else has expired, so abandoned sessions
//! do not accumulate.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::dialogue::SessionContext;
use crate::domain::foundation::{DomainError, ErrorCode, SessionId};
use crate::ports::SessionStore;

struct Entry {
    payload: String,
    expires_at: Instant,
}

/// Process-local session store with per-entry TTL.
#[derive(Default)]
pub struct InMemorySessionStore {
    entries: Mutex<HashMap<SessionId, Entry>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub(crate) async fn entry_count(&self) -> usize {
        self.entries.lock().await.len()
    }

    /// Inserts a raw payload, bypassing serialization. Used to simulate a
    /// damaged stored context.
    #[cfg(test)]
    pub(crate) async fn insert_raw(&self, id: SessionId, payload: &str, ttl: Duration) {
        self.entries.lock().await.insert(
            id,
            Entry { payload: payload.to_string(), expires_at: Instant::now() + ttl },
        );
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, id: &SessionId) -> Result<Option<SessionContext>, DomainError> {
        let mut entries = self.entries.lock().await;
        let Some(entry) = entries.get(id) else {
            return Ok(None);
        };
        if entry.expires_at <= Instant::now() {
            entries.remove(id);
            return Ok(None);
        }
        serde_json::from_str(&entry.payload)
            .map(Some)
            .map_err(|e| {
                DomainError::corrupt_context(format!("unreadable session context: {}", e))
                    .with_detail("session_id", id.to_string())
            })
    }

    async fn set(
        &self,
        id: &SessionId,
        context: &SessionContext,
        ttl: Duration,
    ) -> Result<(), DomainError> {
        let payload = serde_json::to_string(context).map_err(|e| {
            DomainError::new(
                ErrorCode::SessionStoreError,
                format!("failed to serialize session context: {}", e),
            )
        })?;
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(*id, Entry { payload, expires_at: now + ttl });
        Ok(())
    }

    async fn remove(&self, id: &SessionId) -> Result<(), DomainError> {
        self.entries.lock().await.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dialogue::{DialogueStep, Slot};

    fn store() -> InMemorySessionStore {
        InMemorySessionStore::new()
    }

    fn ttl() -> Duration {
        Duration::from_secs(60)
    }

    #[tokio::test]
    async fn unknown_session_is_none() {
        let result = store().get(&SessionId::new()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let store = store();
        let id = SessionId::new();
        let ctx = SessionContext::new().with_step(DialogueStep::Collecting(Slot::Destination));
        store.set(&id, &ctx, ttl()).await.unwrap();
        assert_eq!(store.get(&id).await.unwrap(), Some(ctx));
    }

    #[tokio::test]
    async fn expired_entry_reads_as_none() {
        let store = store();
        let id = SessionId::new();
        store.set(&id, &SessionContext::new(), Duration::from_secs(0)).await.unwrap();
        assert!(store.get(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn set_refreshes_ttl() {
        let store = store();
        let id = SessionId::new();
        store.set(&id, &SessionContext::new(), Duration::from_secs(0)).await.unwrap();
        store.set(&id, &SessionContext::new(), ttl()).await.unwrap();
        assert!(store.get(&id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn remove_deletes_the_entry() {
        let store = store();
        let id = SessionId::new();
        store.set(&id, &SessionContext::new(), ttl()).await.unwrap();
        store.remove(&id).await.unwrap();
        assert!(store.get(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn writes_sweep_expired_entries_of_other_sessions() {
        let store = store();
        let abandoned = SessionId::new();
        store.set(&abandoned, &SessionContext::new(), Duration::from_secs(0)).await.unwrap();
        assert_eq!(store.entry_count().await, 1);

        // A write for a different session reclaims the abandoned one.
        store.set(&SessionId::new(), &SessionContext::new(), ttl()).await.unwrap();
        assert_eq!(store.entry_count().await, 1);
        assert!(store.get(&abandoned).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_payload_is_a_corrupt_context_error() {
        let store = store();
        let id = SessionId::new();
        store.insert_raw(id, "{not json", ttl()).await;
        let err = store.get(&id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CorruptContext);
    }
}
