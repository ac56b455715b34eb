//! The process-turn use case.
//!
//! One call per user message: load the session context, let the dialogue
//! manager decide the turn, run the flight search when every slot is
//! filled, and persist the new context. Turns for the same session are
//! serialized through a per-session lock; turns for different sessions
//! never contend, and a session's lock entry is reclaimed as soon as no
//! turn holds it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use tokio::sync::Mutex;

use crate::adapters::SyntheticFlightSource;
use crate::config::AppConfig;
use crate::domain::dialogue::{
    prompts, DialogueManager, DialogueStep, SessionContext, TurnAction,
};
use crate::domain::foundation::{DomainError, ErrorCode, SessionId, StateMachine};
use crate::domain::nlu::{CityRef, CityRules};
use crate::domain::ranking::{rank, FlightOffer, RankingOutcome};
use crate::ports::{CityResolver, FlightDataSource, SessionStore};

/// What one processed turn sends back to the caller.
#[derive(Debug)]
pub struct TurnResponse {
    pub response_text: String,
    pub quick_replies: Vec<String>,
    pub context: SessionContext,
    /// Present only on turns that ran a search.
    pub ranking: Option<RankingOutcome>,
}

/// Orchestrates dialogue turns over the ports.
pub struct TurnProcessor {
    config: AppConfig,
    manager: DialogueManager,
    resolver: Arc<dyn CityResolver>,
    source: Arc<dyn FlightDataSource>,
    store: Arc<dyn SessionStore>,
    session_locks: Mutex<HashMap<SessionId, Arc<Mutex<()>>>>,
}

impl TurnProcessor {
    pub fn new(
        config: AppConfig,
        resolver: Arc<dyn CityResolver>,
        source: Arc<dyn FlightDataSource>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        let manager = DialogueManager::new(
            CityRules::new(config.nlu.fuzzy_city_threshold),
            config.nlu.max_city_suggestions,
        );
        Self {
            config,
            manager,
            resolver,
            source,
            store,
            session_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Processes one user message against today's date.
    pub async fn process(
        &self,
        session_id: SessionId,
        message: &str,
    ) -> Result<TurnResponse, DomainError> {
        self.process_on(session_id, message, Local::now().date_naive()).await
    }

    /// Processes one user message against an explicit reference date.
    /// Date parsing is relative to `today`, so callers that need
    /// reproducible turns inject it.
    pub async fn process_on(
        &self,
        session_id: SessionId,
        message: &str,
        today: NaiveDate,
    ) -> Result<TurnResponse, DomainError> {
        let lock = self.session_lock(session_id).await;
        let result = {
            let _turn = lock.lock().await;
            self.run_turn(session_id, message, today).await
        };
        self.release_session_lock(session_id, &lock).await;
        result
    }

    async fn run_turn(
        &self,
        session_id: SessionId,
        message: &str,
        today: NaiveDate,
    ) -> Result<TurnResponse, DomainError> {
        let context = match self.store.get(&session_id).await {
            Ok(Some(ctx)) => ctx,
            Ok(None) => SessionContext::new(),
            // An unreadable context is fatal to the turn, not the session:
            // drop it and restart collection.
            Err(err) if err.code == ErrorCode::CorruptContext => {
                tracing::warn!(session = %session_id, error = %err, "discarding stored context");
                self.store.remove(&session_id).await?;
                let fresh = SessionContext::new();
                let reply = prompts::recovery_reply();
                self.save(&session_id, &fresh).await?;
                return Ok(TurnResponse {
                    response_text: reply.text,
                    quick_replies: reply.quick_replies,
                    context: fresh,
                    ranking: None,
                });
            }
            Err(err) => return Err(err),
        };

        let decision = self
            .manager
            .handle_turn(&context, message, today, self.resolver.as_ref())
            .await?;

        match decision.action {
            TurnAction::Respond => {
                self.save(&session_id, &decision.context).await?;
                Ok(TurnResponse {
                    response_text: decision.reply.text,
                    quick_replies: decision.reply.quick_replies,
                    context: decision.context,
                    ranking: None,
                })
            }
            TurnAction::Search => self.run_search(session_id, decision.context).await,
        }
    }

    async fn run_search(
        &self,
        session_id: SessionId,
        ctx: SessionContext,
    ) -> Result<TurnResponse, DomainError> {
        let (Some(origin), Some(destination), Some(date)) =
            (ctx.origin.clone(), ctx.destination.clone(), ctx.date)
        else {
            return Err(DomainError::corrupt_context("search requested without a full route"));
        };

        let offers = self.fetch_offers(&origin, &destination, date).await;
        let outcome = rank(&offers, ctx.preference, &self.config.ranking);

        let step = ctx.step.transition_to(DialogueStep::Complete)?;
        let next = ctx.with_last_flights(outcome.all.clone()).with_step(step);

        let reply = if outcome.all.is_empty() {
            prompts::no_results_reply(&next)
        } else {
            prompts::results_summary(&next, &outcome.all)
        };

        tracing::info!(
            session = %session_id,
            origin = %origin.code,
            destination = %destination.code,
            %date,
            results = outcome.all.len(),
            "search completed"
        );

        self.save(&session_id, &next).await?;
        Ok(TurnResponse {
            response_text: reply.text,
            quick_replies: reply.quick_replies,
            context: next,
            ranking: Some(outcome),
        })
    }

    /// Queries the configured source within its time budget, falling back
    /// to synthetic inventory on failure, timeout, or an empty answer.
    async fn fetch_offers(
        &self,
        origin: &CityRef,
        destination: &CityRef,
        date: NaiveDate,
    ) -> Vec<FlightOffer> {
        let budget = Duration::from_millis(self.config.search.source_timeout_ms);
        let max_results = self.config.search.max_results;

        let attempt = tokio::time::timeout(
            budget,
            self.source.search(origin, destination, date, max_results),
        )
        .await;

        match attempt {
            Ok(Ok(offers)) if !offers.is_empty() => offers,
            Ok(Ok(_)) => {
                tracing::warn!(source = self.source.name(), "source returned no offers");
                SyntheticFlightSource::generate(origin, destination, date, max_results)
            }
            Ok(Err(err)) => {
                tracing::warn!(source = self.source.name(), error = %err, "source failed");
                SyntheticFlightSource::generate(origin, destination, date, max_results)
            }
            Err(_) => {
                tracing::warn!(
                    source = self.source.name(),
                    budget_ms = self.config.search.source_timeout_ms,
                    "source timed out"
                );
                SyntheticFlightSource::generate(origin, destination, date, max_results)
            }
        }
    }

    async fn save(&self, id: &SessionId, ctx: &SessionContext) -> Result<(), DomainError> {
        let ttl = Duration::from_secs(self.config.session.ttl_secs);
        self.store.set(id, ctx, ttl).await
    }

    async fn session_lock(&self, id: SessionId) -> Arc<Mutex<()>> {
        let mut locks = self.session_locks.lock().await;
        locks.entry(id).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }

    /// Removes the session's lock entry once this turn is the only holder.
    ///
    /// Two handles mean the map's and ours: no other turn holds or awaits
    /// the lock, and the map mutex is held here, so no new handle can be
    /// cloned out of the map mid-check.
    async fn release_session_lock(&self, id: SessionId, lock: &Arc<Mutex<()>>) {
        let mut locks = self.session_locks.lock().await;
        if Arc::strong_count(lock) == 2 {
            locks.remove(&id);
        }
    }

    #[cfg(test)]
    async fn session_lock_count(&self) -> usize {
        self.session_locks.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::adapters::{CityDirectory, InMemorySessionStore};
    use crate::domain::dialogue::Slot;
    use crate::domain::ranking::Category;
    use crate::ports::SourceError;

    struct FailingSource;

    #[async_trait]
    impl FlightDataSource for FailingSource {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn search(
            &self,
            _origin: &CityRef,
            _destination: &CityRef,
            _date: NaiveDate,
            _max_results: usize,
        ) -> Result<Vec<FlightOffer>, SourceError> {
            Err(SourceError::Unavailable("connection refused".into()))
        }
    }

    struct SlowSource;

    #[async_trait]
    impl FlightDataSource for SlowSource {
        fn name(&self) -> &'static str {
            "slow"
        }

        async fn search(
            &self,
            _origin: &CityRef,
            _destination: &CityRef,
            _date: NaiveDate,
            _max_results: usize,
        ) -> Result<Vec<FlightOffer>, SourceError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(vec![])
        }
    }

    struct EmptySource;

    #[async_trait]
    impl FlightDataSource for EmptySource {
        fn name(&self) -> &'static str {
            "empty"
        }

        async fn search(
            &self,
            _origin: &CityRef,
            _destination: &CityRef,
            _date: NaiveDate,
            _max_results: usize,
        ) -> Result<Vec<FlightOffer>, SourceError> {
            Ok(Vec::new())
        }
    }

    fn processor_with(source: Arc<dyn FlightDataSource>) -> TurnProcessor {
        let mut config = AppConfig::default();
        config.search.source_timeout_ms = 100;
        TurnProcessor::new(
            config,
            Arc::new(CityDirectory::new()),
            source,
            Arc::new(InMemorySessionStore::new()),
        )
    }

    fn processor() -> TurnProcessor {
        processor_with(Arc::new(SyntheticFlightSource::new()))
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 10).unwrap()
    }

    async fn say(p: &TurnProcessor, id: SessionId, message: &str) -> TurnResponse {
        p.process_on(id, message, today()).await.unwrap()
    }

    #[tokio::test]
    async fn full_conversation_produces_ranked_results() {
        let p = processor();
        let id = SessionId::new();

        say(&p, id, "mumbai").await;
        say(&p, id, "delhi").await;
        say(&p, id, "25 dec 2025").await;
        let response = say(&p, id, "cheapest").await;

        let outcome = response.ranking.unwrap();
        assert!(!outcome.all.is_empty());
        assert!(outcome.cheapest.is_some());
        assert!(outcome.shortest.is_some());
        assert!(outcome.most_convenient.is_some());
        assert_eq!(response.context.step, DialogueStep::Complete);
        assert!(response.response_text.starts_with("Found"));
    }

    #[tokio::test]
    async fn context_persists_across_turns() {
        let p = processor();
        let id = SessionId::new();

        say(&p, id, "mumbai").await;
        let response = say(&p, id, "goa").await;
        assert_eq!(response.context.origin.as_ref().unwrap().code, "BOM");
        assert_eq!(response.context.destination.as_ref().unwrap().code, "GOI");
    }

    #[tokio::test]
    async fn sessions_do_not_share_context() {
        let p = processor();
        let a = SessionId::new();
        let b = SessionId::new();

        say(&p, a, "mumbai").await;
        let response = say(&p, b, "delhi").await;
        assert_eq!(response.context.origin.as_ref().unwrap().code, "DEL");
    }

    #[tokio::test]
    async fn failing_source_falls_back_to_synthetic_inventory() {
        let p = processor_with(Arc::new(FailingSource));
        let id = SessionId::new();

        let response = p
            .process_on(id, "cheapest from mumbai to delhi on 2025-12-25", today())
            .await
            .unwrap();

        let outcome = response.ranking.unwrap();
        assert!(!outcome.all.is_empty());
        assert!(outcome.cheapest.is_some());
        assert!(outcome.shortest.is_some());
        assert!(outcome.most_convenient.is_some());
    }

    #[tokio::test]
    async fn empty_source_answer_falls_back_to_synthetic_inventory() {
        let p = processor_with(Arc::new(EmptySource));
        let id = SessionId::new();

        let response = p
            .process_on(id, "cheapest from mumbai to delhi on 2025-12-25", today())
            .await
            .unwrap();

        let outcome = response.ranking.unwrap();
        assert!(!outcome.all.is_empty());
        assert!(outcome.cheapest.is_some());
        assert!(outcome.shortest.is_some());
        assert!(outcome.most_convenient.is_some());
        assert_eq!(response.context.step, DialogueStep::Complete);
    }

    #[tokio::test]
    async fn finished_turns_leave_no_session_locks_behind() {
        let p = processor();

        say(&p, SessionId::new(), "mumbai").await;
        say(&p, SessionId::new(), "delhi").await;

        assert_eq!(p.session_lock_count().await, 0);
    }

    #[tokio::test]
    async fn slow_source_times_out_into_fallback() {
        let p = processor_with(Arc::new(SlowSource));
        let id = SessionId::new();

        let response = p
            .process_on(id, "fastest from mumbai to delhi on 2025-12-25", today())
            .await
            .unwrap();
        assert!(!response.ranking.unwrap().all.is_empty());
    }

    #[tokio::test]
    async fn corrupt_stored_context_recovers_with_a_fresh_session() {
        let store = Arc::new(InMemorySessionStore::new());
        let p = TurnProcessor::new(
            AppConfig::default(),
            Arc::new(CityDirectory::new()),
            Arc::new(SyntheticFlightSource::new()),
            store.clone(),
        );
        let id = SessionId::new();
        store.insert_raw(id, "{definitely not json", Duration::from_secs(60)).await;

        let response = p.process_on(id, "mumbai", today()).await.unwrap();
        assert_eq!(response.context, SessionContext::new());
        assert!(response.response_text.contains("start over"));

        // The next turn proceeds normally on the fresh context.
        let next = say(&p, id, "mumbai").await;
        assert_eq!(next.context.origin.as_ref().unwrap().code, "BOM");
    }

    #[tokio::test]
    async fn search_again_after_results_starts_a_fresh_request() {
        let p = processor();
        let id = SessionId::new();

        say(&p, id, "from mumbai to delhi on 2025-12-25").await;
        say(&p, id, "cheapest").await;
        let again = say(&p, id, "search again").await;

        assert_eq!(again.context.step, DialogueStep::Collecting(Slot::Origin));
        assert!(again.context.origin.is_none());
        assert!(again.ranking.is_none());

        // The discarded request does not leak into the new one.
        let response = say(&p, id, "goa").await;
        assert_eq!(response.context.origin.as_ref().unwrap().code, "GOI");
    }

    #[tokio::test]
    async fn cheapest_category_pick_has_the_lowest_fare() {
        let p = processor();
        let id = SessionId::new();
        let response = p
            .process_on(id, "cheapest from mumbai to delhi on 2025-12-25", today())
            .await
            .unwrap();
        let outcome = response.ranking.unwrap();
        let cheapest = outcome.cheapest.unwrap();
        let min = outcome.all.iter().map(|f| f.offer.price).fold(f64::INFINITY, f64::min);
        assert_eq!(cheapest.offer.price, min);
        assert_eq!(cheapest.category, Some(Category::Cheapest));
    }
}
