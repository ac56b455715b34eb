//! End-to-end conversation flows through the public API.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use fareline::adapters::{CityDirectory, InMemorySessionStore, SyntheticFlightSource};
use fareline::application::{TurnProcessor, TurnResponse};
use fareline::config::AppConfig;
use fareline::domain::dialogue::{DialogueStep, Slot};
use fareline::domain::foundation::SessionId;
use fareline::domain::nlu::CityRef;
use fareline::domain::ranking::FlightOffer;
use fareline::ports::{FlightDataSource, SourceError};

fn today() -> NaiveDate {
    // A Wednesday, pinned so relative dates are reproducible.
    NaiveDate::from_ymd_opt(2025, 12, 10).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn processor() -> TurnProcessor {
    TurnProcessor::new(
        AppConfig::default(),
        Arc::new(CityDirectory::new()),
        Arc::new(SyntheticFlightSource::new()),
        Arc::new(InMemorySessionStore::new()),
    )
}

async fn say(p: &TurnProcessor, id: SessionId, message: &str) -> TurnResponse {
    p.process_on(id, message, today()).await.expect("turn should succeed")
}

#[tokio::test]
async fn day_only_date_is_inferred_and_confirmed() {
    let p = processor();
    let id = SessionId::new();

    say(&p, id, "mumbai").await;
    say(&p, id, "delhi").await;
    let response = say(&p, id, "25").await;

    assert_eq!(response.context.step, DialogueStep::DateConfirmation);
    assert_eq!(response.context.date, Some(date(2025, 12, 25)));
    let candidate = response.context.pending_confirmation.as_ref().unwrap();
    assert!(candidate.alternatives.contains(&date(2026, 1, 25)));
    assert!(candidate.alternatives.contains(&date(2026, 12, 25)));

    // Accepting keeps the inferred date and moves to preference.
    let accepted = say(&p, id, "yes").await;
    assert_eq!(accepted.context.date, Some(date(2025, 12, 25)));
    assert!(accepted.context.pending_confirmation.is_none());
    assert_eq!(accepted.context.step, DialogueStep::Collecting(Slot::Preference));
}

#[tokio::test]
async fn rejecting_the_inferred_date_clears_it_and_recollects() {
    let p = processor();
    let id = SessionId::new();

    say(&p, id, "mumbai").await;
    say(&p, id, "delhi").await;
    say(&p, id, "25").await;
    let response = say(&p, id, "no").await;

    assert_eq!(response.context.step, DialogueStep::Collecting(Slot::Date));
    assert!(response.context.date.is_none());
    assert!(response.context.pending_confirmation.is_none());
    // Origin and destination survive the rejection.
    assert_eq!(response.context.origin.as_ref().unwrap().code, "BOM");
    assert_eq!(response.context.destination.as_ref().unwrap().code, "DEL");
}

#[tokio::test]
async fn same_city_destination_is_rejected_with_suggestions() {
    let p = processor();
    let id = SessionId::new();

    say(&p, id, "mumbai").await;
    let response = say(&p, id, "bombay").await;

    assert_eq!(response.context.step, DialogueStep::Collecting(Slot::Destination));
    assert!(response.context.destination.is_none());
    assert!(response.response_text.to_lowercase().contains("mumbai"));
    assert!(!response.quick_replies.is_empty());
    assert!(!response.quick_replies.contains(&"mumbai".to_string()));
}

#[tokio::test]
async fn time_preference_produces_all_three_categories() {
    let p = processor();
    let id = SessionId::new();

    say(&p, id, "mumbai").await;
    say(&p, id, "delhi").await;
    say(&p, id, "25 dec 2025").await;
    let response = say(&p, id, "fastest").await;

    let outcome = response.ranking.expect("search should have run");
    let shortest = outcome.shortest.expect("shortest pick");
    let cheapest = outcome.cheapest.expect("cheapest pick");
    outcome.most_convenient.expect("most convenient pick");

    // The shortest pick prefers nonstop offers; within its pool nothing
    // is faster.
    let pool: Vec<&fareline::domain::ranking::RankedFlight> =
        if outcome.all.iter().any(|f| f.offer.is_nonstop()) {
            outcome.all.iter().filter(|f| f.offer.is_nonstop()).collect()
        } else {
            outcome.all.iter().collect()
        };
    assert!(pool.iter().all(|f| f.offer.duration_minutes >= shortest.offer.duration_minutes));

    // The cheapest pick is the global fare minimum.
    assert!(outcome.all.iter().all(|f| f.offer.price >= cheapest.offer.price));
}

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
        Err(SourceError::Unavailable("boom".into()))
    }
}

#[tokio::test]
async fn source_failure_still_answers_with_all_categories() {
    let p = TurnProcessor::new(
        AppConfig::default(),
        Arc::new(CityDirectory::new()),
        Arc::new(FailingSource),
        Arc::new(InMemorySessionStore::new()),
    );
    let id = SessionId::new();

    let response = say(&p, id, "cheapest from mumbai to delhi on 2025-12-25").await;

    let outcome = response.ranking.expect("fallback search should have run");
    assert!(!outcome.all.is_empty());
    assert!(outcome.cheapest.is_some());
    assert!(outcome.shortest.is_some());
    assert!(outcome.most_convenient.is_some());
    assert_eq!(response.context.step, DialogueStep::Complete);
}

#[tokio::test]
async fn fast_path_with_every_slot_searches_in_one_turn() {
    let p = processor();
    let id = SessionId::new();

    let response = say(&p, id, "cheapest flight from mumbai to goa on 2025-12-25").await;

    assert_eq!(response.context.step, DialogueStep::Complete);
    assert!(response.ranking.is_some());
    assert!(response.response_text.starts_with("Found"));
}

#[tokio::test]
async fn follow_up_intents_work_after_results() {
    let p = processor();
    let id = SessionId::new();

    say(&p, id, "cheapest from mumbai to delhi on 2025-12-25").await;

    let changed = say(&p, id, "change date").await;
    assert_eq!(changed.context.step, DialogueStep::Collecting(Slot::Date));
    assert!(changed.context.date.is_none());

    let searched = say(&p, id, "2025-12-30").await;
    assert_eq!(searched.context.step, DialogueStep::Complete);
    assert_eq!(searched.context.date, Some(date(2025, 12, 30)));
    assert!(searched.ranking.is_some());
}

#[tokio::test]
async fn misspelled_city_resolves_fuzzily() {
    let p = processor();
    let id = SessionId::new();

    let response = say(&p, id, "mumbay").await;
    assert_eq!(response.context.origin.as_ref().unwrap().code, "BOM");
    assert_eq!(response.context.step, DialogueStep::Collecting(Slot::Destination));
}

#[tokio::test]
async fn identical_conversations_rank_identically() {
    let run = |_: u32| async {
        let p = processor();
        let id = SessionId::new();
        say(&p, id, "cheapest from mumbai to delhi on 2025-12-25").await
    };
    let a = run(1).await.ranking.unwrap();
    let b = run(2).await.ranking.unwrap();
    assert_eq!(a.all, b.all);
    assert_eq!(a.cheapest, b.cheapest);
}
