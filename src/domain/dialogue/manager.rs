//! Turn-by-turn dialogue decisions.
//!
//! `DialogueManager` is a pure decision function over an immutable context:
//! it never performs I/O beyond city resolution and never touches the
//! session store or flight sources. A turn yields a new context, a reply,
//! and an action telling the application layer whether to search.

use chrono::NaiveDate;

use super::{
    match_route, prompts, DateCandidate, DialogueStep, Reply, RouteUtterance, SessionContext, Slot,
};
use crate::domain::foundation::{DomainError, StateMachine, ValidationError};
use crate::domain::nlu::{confirmation_alternatives, CityRef, CityRules, DateParser, Preference};
use crate::ports::CityResolver;

/// What the application layer should do after this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnAction {
    /// Send the reply; nothing else to do.
    Respond,
    /// Every slot is filled: run the flight search, then reply with
    /// ranked results.
    Search,
}

/// Outcome of one dialogue turn.
#[derive(Debug)]
pub struct TurnDecision {
    pub context: SessionContext,
    pub reply: Reply,
    pub action: TurnAction,
}

impl TurnDecision {
    fn respond(context: SessionContext, reply: Reply) -> Self {
        Self { context, reply, action: TurnAction::Respond }
    }
}

/// Slot-filling dialogue manager.
pub struct DialogueManager {
    date_parser: DateParser,
    city_rules: CityRules,
    max_suggestions: usize,
}

impl Default for DialogueManager {
    fn default() -> Self {
        Self::new(CityRules::default(), 6)
    }
}

impl DialogueManager {
    pub fn new(city_rules: CityRules, max_suggestions: usize) -> Self {
        Self { date_parser: DateParser::new(), city_rules, max_suggestions }
    }

    /// Decides one turn.
    ///
    /// The input context is taken as-is except for integrity repair: a
    /// step inconsistent with the filled slots is reconciled before any
    /// handling, so a damaged stored context costs at most one re-prompt.
    pub async fn handle_turn(
        &self,
        context: &SessionContext,
        message: &str,
        today: NaiveDate,
        resolver: &dyn CityResolver,
    ) -> Result<TurnDecision, DomainError> {
        let ctx = context.reconciled();
        let message = message.trim();
        if message.is_empty() {
            return self.reprompt(ctx);
        }

        match ctx.step {
            DialogueStep::Initial | DialogueStep::Collecting(_) => {
                self.handle_gathering(ctx, message, today, resolver).await
            }
            DialogueStep::DateConfirmation => self.handle_confirmation(ctx, message, today),
            // A context abandoned mid-search: if it is still complete,
            // search again, otherwise fall back to collection.
            DialogueStep::Searching => {
                if ctx.ready_to_search() {
                    Ok(TurnDecision {
                        reply: Reply::plain("Searching flights..."),
                        context: ctx,
                        action: TurnAction::Search,
                    })
                } else {
                    let slot = ctx.first_unresolved_slot().unwrap_or(Slot::Origin);
                    self.reprompt(ctx.with_step(DialogueStep::Collecting(slot)))
                }
            }
            DialogueStep::Complete => self.handle_complete(ctx, message, today, resolver).await,
        }
    }

    /// The prompt for wherever the dialogue currently is, without
    /// consuming any input. Asking twice gets the same answer.
    fn reprompt(&self, ctx: SessionContext) -> Result<TurnDecision, DomainError> {
        let reply = match (&ctx.step, &ctx.pending_confirmation) {
            (DialogueStep::Initial, _) => prompts::greeting(),
            (DialogueStep::Collecting(slot), _) => prompts::slot_prompt(*slot, &ctx),
            (DialogueStep::DateConfirmation, Some(candidate)) => {
                prompts::confirmation_prompt(candidate, &ctx)
            }
            _ => prompts::greeting(),
        };
        Ok(TurnDecision::respond(ctx, reply))
    }

    async fn handle_gathering(
        &self,
        ctx: SessionContext,
        message: &str,
        today: NaiveDate,
        resolver: &dyn CityResolver,
    ) -> Result<TurnDecision, DomainError> {
        // A whole route in one utterance short-circuits slot-by-slot
        // collection from any gathering step; the new route replaces any
        // previously resolved origin and destination.
        if let Some(route) = match_route(message) {
            return self.handle_route(ctx, route, message, today, resolver).await;
        }

        let slot = match ctx.step {
            DialogueStep::Collecting(slot) => slot,
            _ => Slot::Origin,
        };

        match slot {
            Slot::Origin => match self.resolve_city(message, resolver).await? {
                Some(city) => self.advance(ctx.with_origin(city)),
                None => self.unresolved_city(ctx, message, resolver).await,
            },
            Slot::Destination => match self.resolve_city(message, resolver).await? {
                Some(city) => self.fill_destination(ctx, city, resolver).await,
                None => self.unresolved_city(ctx, message, resolver).await,
            },
            Slot::Date => self.fill_date(ctx, message, today),
            Slot::Preference => match Preference::parse(message) {
                Some(preference) => self.advance(ctx.with_preference(preference)),
                None => {
                    let reply = prompts::unknown_preference_reply(&ctx);
                    Ok(TurnDecision::respond(ctx, reply))
                }
            },
        }
    }

    /// Fills as many slots as one route utterance provides, then advances.
    async fn handle_route(
        &self,
        ctx: SessionContext,
        route: RouteUtterance,
        message: &str,
        today: NaiveDate,
        resolver: &dyn CityResolver,
    ) -> Result<TurnDecision, DomainError> {
        let origin = match self.resolve_city(&route.origin_raw, resolver).await? {
            Some(city) => city,
            None => return self.unresolved_city(ctx, &route.origin_raw, resolver).await,
        };

        // A date may trail the destination without an "on": try the full
        // text first, then peel trailing words off as a date expression.
        let (destination, date_raw) = match route.date_raw {
            Some(raw) => match self.resolve_city(&route.destination_raw, resolver).await? {
                Some(city) => (city, Some(raw)),
                None => {
                    return self.unresolved_city(ctx, &route.destination_raw, resolver).await
                }
            },
            None => {
                match self.resolve_city_with_tail(&route.destination_raw, today, resolver).await? {
                    Some(split) => split,
                    None => {
                        return self.unresolved_city(ctx, &route.destination_raw, resolver).await
                    }
                }
            }
        };

        if destination.code == origin.code {
            return self.same_city(ctx, &origin, resolver).await;
        }

        let mut next = ctx.with_origin(origin).with_destination(destination);
        if let Some(preference) = Preference::parse(message) {
            next = next.with_preference(preference);
        }

        match date_raw {
            Some(raw) => self.fill_date(next, &raw, today),
            None => self.advance(next),
        }
    }

    async fn fill_destination(
        &self,
        ctx: SessionContext,
        city: CityRef,
        resolver: &dyn CityResolver,
    ) -> Result<TurnDecision, DomainError> {
        match &ctx.origin {
            Some(origin) if origin.code == city.code => {
                let origin = origin.clone();
                self.same_city(ctx, &origin, resolver).await
            }
            _ => self.advance(ctx.with_destination(city)),
        }
    }

    /// Parses and stores a travel date, routing inferred dates through the
    /// confirmation sub-flow.
    fn fill_date(
        &self,
        ctx: SessionContext,
        raw: &str,
        today: NaiveDate,
    ) -> Result<TurnDecision, DomainError> {
        // Date errors re-prompt from date collection even when the raw
        // text arrived inside a fast-path utterance.
        let ctx = if ctx.step == DialogueStep::Collecting(Slot::Date) {
            ctx
        } else {
            let step = ctx.step.transition_to(DialogueStep::Collecting(Slot::Date))?;
            ctx.with_step(step)
        };

        match self.date_parser.parse_checked(raw, today) {
            Ok(parsed) if parsed.inferred => {
                let candidate = DateCandidate {
                    raw_input: raw.to_string(),
                    inferred_iso: parsed.iso,
                    alternatives: confirmation_alternatives(parsed.iso, today),
                };
                let step = ctx.step.transition_to(DialogueStep::DateConfirmation)?;
                let next = ctx
                    .with_date(parsed.iso)
                    .with_pending_confirmation(candidate.clone())
                    .with_step(step);
                let reply = prompts::confirmation_prompt(&candidate, &next);
                Ok(TurnDecision::respond(next, reply))
            }
            Ok(parsed) => self.advance(ctx.with_date(parsed.iso)),
            Err(ValidationError::PastDate { iso }) => {
                let reply = prompts::past_date_reply(&iso, &ctx);
                Ok(TurnDecision::respond(ctx, reply))
            }
            Err(ValidationError::SameDay { .. }) => {
                let reply = prompts::same_day_reply(&ctx);
                Ok(TurnDecision::respond(ctx, reply))
            }
            Err(_) => {
                let reply = prompts::unparseable_date_reply(raw, &ctx);
                Ok(TurnDecision::respond(ctx, reply))
            }
        }
    }

    fn handle_confirmation(
        &self,
        ctx: SessionContext,
        message: &str,
        today: NaiveDate,
    ) -> Result<TurnDecision, DomainError> {
        let candidate = match ctx.pending_confirmation.clone() {
            Some(candidate) => candidate,
            // Reconciliation already rewrote this case to date collection.
            None => return self.reprompt(ctx),
        };

        if prompts::is_affirmative(message) {
            return self.advance(ctx.without_pending_confirmation());
        }
        if prompts::is_negative(message) {
            let step = ctx.step.transition_to(DialogueStep::Collecting(Slot::Date))?;
            let next = ctx.with_slot_cleared(Slot::Date).with_step(step);
            let reply = prompts::slot_prompt(Slot::Date, &next);
            return Ok(TurnDecision::respond(next, reply));
        }

        // Anything else is read as a replacement date: an exact one
        // resolves the sub-flow, an inferred one restarts it, and
        // unreadable input repeats the same options.
        match self.date_parser.parse(message, today) {
            Some(parsed) if parsed.inferred => {
                let replacement = DateCandidate {
                    raw_input: message.to_string(),
                    inferred_iso: parsed.iso,
                    alternatives: confirmation_alternatives(parsed.iso, today),
                };
                let next = ctx
                    .with_date(parsed.iso)
                    .with_pending_confirmation(replacement.clone());
                let reply = prompts::confirmation_prompt(&replacement, &next);
                Ok(TurnDecision::respond(next, reply))
            }
            Some(parsed) => {
                self.advance(ctx.with_date(parsed.iso).without_pending_confirmation())
            }
            None => {
                let reply = prompts::confirmation_prompt(&candidate, &ctx);
                Ok(TurnDecision::respond(ctx, reply))
            }
        }
    }

    async fn handle_complete(
        &self,
        ctx: SessionContext,
        message: &str,
        today: NaiveDate,
        resolver: &dyn CityResolver,
    ) -> Result<TurnDecision, DomainError> {
        let lowered = message.to_lowercase();

        // "Search again" discards the whole request and starts collection
        // over; slot-change intents clear only the named slot.
        if lowered.contains("search again") || lowered == "again" {
            let step = ctx.step.transition_to(DialogueStep::Collecting(Slot::Origin))?;
            let next = ctx.reset().with_step(step);
            let reply = prompts::slot_prompt(Slot::Origin, &next);
            return Ok(TurnDecision::respond(next, reply));
        }
        for (phrase, slot) in [
            ("change date", Slot::Date),
            ("change destination", Slot::Destination),
            ("change origin", Slot::Origin),
        ] {
            if lowered.contains(phrase) {
                let step = ctx.step.transition_to(DialogueStep::Collecting(slot))?;
                let next = ctx.with_slot_cleared(slot).with_step(step);
                let reply = prompts::slot_prompt(slot, &next);
                return Ok(TurnDecision::respond(next, reply));
            }
        }

        // A fresh route starts a new search from scratch.
        if let Some(route) = match_route(message) {
            return self.handle_route(ctx.reset(), route, message, today, resolver).await;
        }

        Ok(TurnDecision::respond(
            ctx,
            Reply::with_quick_replies(
                "You can search again, change the date, or pick a new route - just say \
                 something like 'from Mumbai to Goa'."
                    .to_string(),
                vec![
                    "Search again".to_string(),
                    "Change date".to_string(),
                    "Change destination".to_string(),
                ],
            ),
        ))
    }

    /// Moves to the first unresolved slot, or to searching when none is
    /// left.
    fn advance(&self, ctx: SessionContext) -> Result<TurnDecision, DomainError> {
        match ctx.first_unresolved_slot() {
            None => {
                let step = ctx.step.transition_to(DialogueStep::Searching)?;
                Ok(TurnDecision {
                    reply: Reply::plain("Searching flights..."),
                    context: ctx.with_step(step),
                    action: TurnAction::Search,
                })
            }
            Some(slot) => {
                let step = if ctx.step == DialogueStep::Collecting(slot) {
                    ctx.step
                } else {
                    ctx.step.transition_to(DialogueStep::Collecting(slot))?
                };
                let next = ctx.with_step(step);
                let reply = prompts::slot_prompt(slot, &next);
                Ok(TurnDecision::respond(next, reply))
            }
        }
    }

    async fn resolve_city(
        &self,
        raw: &str,
        resolver: &dyn CityResolver,
    ) -> Result<Option<CityRef>, DomainError> {
        let candidate = resolver.resolve(raw).await?;
        Ok(candidate.and_then(|c| self.city_rules.accept(c)))
    }

    /// Resolves "goa tomorrow" style text: peels up to three trailing
    /// words off as a date expression, accepting the split only when the
    /// remaining head resolves to a city AND the tail parses as a date.
    async fn resolve_city_with_tail(
        &self,
        raw: &str,
        today: NaiveDate,
        resolver: &dyn CityResolver,
    ) -> Result<Option<(CityRef, Option<String>)>, DomainError> {
        if let Some(city) = self.resolve_city(raw, resolver).await? {
            return Ok(Some((city, None)));
        }

        let words: Vec<&str> = raw.split_whitespace().collect();
        for tail_len in 1..=3.min(words.len().saturating_sub(1)) {
            let head = words[..words.len() - tail_len].join(" ");
            let tail = words[words.len() - tail_len..].join(" ");
            if self.date_parser.parse(&tail, today).is_none() {
                continue;
            }
            if let Some(city) = self.resolve_city(&head, resolver).await? {
                return Ok(Some((city, Some(tail))));
            }
        }
        Ok(None)
    }

    async fn unresolved_city(
        &self,
        ctx: SessionContext,
        raw: &str,
        resolver: &dyn CityResolver,
    ) -> Result<TurnDecision, DomainError> {
        let suggestions = resolver.suggestions(raw, self.max_suggestions).await?;
        let reply = prompts::unresolved_city_reply(raw, &suggestions, &ctx);
        Ok(TurnDecision::respond(ctx, reply))
    }

    async fn same_city(
        &self,
        ctx: SessionContext,
        origin: &CityRef,
        resolver: &dyn CityResolver,
    ) -> Result<TurnDecision, DomainError> {
        let mut reply = prompts::same_city_reply(&origin.canonical_name, &ctx);
        reply.quick_replies = resolver
            .suggestions(&origin.canonical_name, self.max_suggestions)
            .await?
            .into_iter()
            .filter(|name| *name != origin.canonical_name)
            .collect();
        Ok(TurnDecision::respond(ctx, reply))
    }
}
