//! Reply text and prompt construction.
//!
//! Every user-visible string the dialogue produces lives here, so the
//! manager stays a pure decision function and the wording can change
//! without touching transition logic.

use super::{DateCandidate, SessionContext, Slot};
use crate::domain::ranking::RankedFlight;

/// What the assistant says back, plus tappable shortcuts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub quick_replies: Vec<String>,
}

impl Reply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self { text: text.into(), quick_replies: Vec::new() }
    }

    pub fn with_quick_replies(text: impl Into<String>, quick_replies: Vec<String>) -> Self {
        Self { text: text.into(), quick_replies }
    }
}

/// Words treated as accepting a pending confirmation.
pub const AFFIRMATIVE_WORDS: &[&str] =
    &["yes", "yeah", "yep", "correct", "right", "confirm", "ok", "okay", "sure"];

/// Words treated as rejecting a pending confirmation.
pub const NEGATIVE_WORDS: &[&str] = &["no", "nope", "nah", "wrong", "incorrect"];

/// True when the message, lowercased and trimmed, is a bare affirmative.
pub fn is_affirmative(message: &str) -> bool {
    let word = message.trim().to_lowercase();
    AFFIRMATIVE_WORDS.contains(&word.as_str())
}

/// True when the message, lowercased and trimmed, is a bare negative.
pub fn is_negative(message: &str) -> bool {
    let word = message.trim().to_lowercase();
    NEGATIVE_WORDS.contains(&word.as_str())
}

/// One-line summary of what has been gathered so far, appended to prompts
/// so the user always sees the current state of the request.
pub fn context_chip(ctx: &SessionContext) -> Option<String> {
    let mut parts = Vec::new();
    match (&ctx.origin, &ctx.destination) {
        (Some(o), Some(d)) => {
            parts.push(format!("🛫 {} → {}", title_case(&o.canonical_name), title_case(&d.canonical_name)))
        }
        (Some(o), None) => parts.push(format!("🛫 {}", title_case(&o.canonical_name))),
        _ => {}
    }
    if let Some(date) = ctx.date {
        parts.push(format!("📅 {}", date.format("%d %b %Y")));
    }
    if let Some(pref) = ctx.preference {
        parts.push(format!("✨ {}", pref.label()));
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" | "))
    }
}

/// The question asked when a slot is the next one to collect.
pub fn slot_prompt(slot: Slot, ctx: &SessionContext) -> Reply {
    let question = match slot {
        Slot::Origin => "Which city are you flying from?".to_string(),
        Slot::Destination => match &ctx.origin {
            Some(o) => format!("Where are you flying to from {}?", title_case(&o.canonical_name)),
            None => "Where are you flying to?".to_string(),
        },
        Slot::Date => "When would you like to travel? You can say a date like 25 Dec, \
                       'tomorrow', or 'next friday'."
            .to_string(),
        Slot::Preference => "What matters most to you: price, time, or convenience?".to_string(),
    };
    let quick_replies = match slot {
        Slot::Preference => {
            vec!["Cheapest".to_string(), "Fastest".to_string(), "Most convenient".to_string()]
        }
        _ => Vec::new(),
    };
    Reply::with_quick_replies(with_chip(question, ctx), quick_replies)
}

/// Greeting for the very first turn.
pub fn greeting() -> Reply {
    Reply::plain(
        "Hi! I can help you find flights. Which city are you flying from? \
         You can also just say something like 'from Mumbai to Delhi on 25 Dec'.",
    )
}

/// Asks the user to confirm an inferred date, listing alternatives.
pub fn confirmation_prompt(candidate: &DateCandidate, ctx: &SessionContext) -> Reply {
    let mut text = format!(
        "Did you mean {}?",
        candidate.inferred_iso.format("%A, %d %b %Y")
    );
    if !candidate.alternatives.is_empty() {
        let listed: Vec<String> =
            candidate.alternatives.iter().map(|d| d.format("%d %b %Y").to_string()).collect();
        text.push_str(&format!(" Other options: {}.", listed.join(", ")));
    }
    Reply::with_quick_replies(
        with_chip(text, ctx),
        vec!["Yes".to_string(), "No".to_string()],
    )
}

/// Rejection message when origin and destination resolve to the same city.
pub fn same_city_reply(city_name: &str, ctx: &SessionContext) -> Reply {
    Reply::plain(with_chip(
        format!(
            "Origin and destination are both {} - please pick a different destination.",
            title_case(city_name)
        ),
        ctx,
    ))
}

/// Reply for a city the resolver could not place, with suggestions.
pub fn unresolved_city_reply(raw: &str, suggestions: &[String], ctx: &SessionContext) -> Reply {
    let text = if suggestions.is_empty() {
        format!("I couldn't find a city matching '{}'. Could you try another spelling?", raw)
    } else {
        format!(
            "I couldn't find a city matching '{}'. Did you mean one of: {}?",
            raw,
            suggestions.join(", ")
        )
    };
    Reply::with_quick_replies(
        with_chip(text, ctx),
        suggestions.iter().map(|s| title_case(s)).collect(),
    )
}

/// Reply for a date the parser could not read.
pub fn unparseable_date_reply(raw: &str, ctx: &SessionContext) -> Reply {
    Reply::plain(with_chip(
        format!(
            "I couldn't read '{}' as a date. Try something like 25 Dec 2025, \
             'tomorrow', or 'next friday'.",
            raw
        ),
        ctx,
    ))
}

/// Reply for a date in the past.
pub fn past_date_reply(iso: &str, ctx: &SessionContext) -> Reply {
    Reply::plain(with_chip(
        format!(
            "{} has already passed - I can only search upcoming dates. When would you \
             like to travel?",
            iso
        ),
        ctx,
    ))
}

/// Reply for a date expression that resolves to the current day.
pub fn same_day_reply(ctx: &SessionContext) -> Reply {
    Reply::plain(with_chip(
        "That date is today. Say 'today' if you want a same-day flight, or give a \
         later date."
            .to_string(),
        ctx,
    ))
}

/// Reply for a preference word that matched none of the three categories.
pub fn unknown_preference_reply(ctx: &SessionContext) -> Reply {
    Reply::with_quick_replies(
        with_chip(
            "I didn't catch that. What matters most: price, time, or convenience?".to_string(),
            ctx,
        ),
        vec!["Cheapest".to_string(), "Fastest".to_string(), "Most convenient".to_string()],
    )
}

/// Summary line shown with ranked search results.
pub fn results_summary(ctx: &SessionContext, flights: &[RankedFlight]) -> Reply {
    let origin = ctx.origin.as_ref().map(|c| title_case(&c.canonical_name)).unwrap_or_default();
    let destination =
        ctx.destination.as_ref().map(|c| title_case(&c.canonical_name)).unwrap_or_default();
    let date = ctx.date.map(|d| d.format("%d %b %Y").to_string()).unwrap_or_default();

    let mut text = format!(
        "Found {} flights from {} to {} on {}",
        flights.len(),
        origin,
        destination,
        date
    );
    let min = flights.iter().map(|f| f.offer.price).fold(f64::INFINITY, f64::min);
    let max = flights.iter().map(|f| f.offer.price).fold(f64::NEG_INFINITY, f64::max);
    if min.is_finite() && max.is_finite() {
        text.push_str(&format!(" | ₹{:.0} - ₹{:.0}", min, max));
    }
    Reply::with_quick_replies(
        text,
        vec![
            "Search again".to_string(),
            "Change date".to_string(),
            "Change destination".to_string(),
        ],
    )
}

/// Reply when a search turned up nothing for the requested day.
pub fn no_results_reply(ctx: &SessionContext) -> Reply {
    Reply::with_quick_replies(
        with_chip(
            "I couldn't find any flights for that day. Want to try a different date?".to_string(),
            ctx,
        ),
        vec!["Change date".to_string(), "Search again".to_string()],
    )
}

/// Generic recovery prompt after an unreadable stored context.
pub fn recovery_reply() -> Reply {
    Reply::plain(
        "Sorry, I lost track of where we were - let's start over. \
         Which city are you flying from?",
    )
}

fn with_chip(text: String, ctx: &SessionContext) -> String {
    match context_chip(ctx) {
        Some(chip) => format!("{}\n{}", text, chip),
        None => text,
    }
}

fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
