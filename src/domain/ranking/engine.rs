//! The ranking engine.
//!
//! `rank` is a pure function from (offers, preference) to a fully ordered
//! list plus three category picks. Ordering is total: composite score
//! descending, ties broken by ascending price, ascending duration, then
//! lexical carrier code, so two runs over the same input always agree.

use std::cmp::Ordering;

use super::offer::{Badge, Category, FlightOffer, RankedFlight};
use super::score::{RankingConfig, SubScores};
use crate::domain::nlu::Preference;

/// Result of one ranking pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingOutcome {
    /// Every offer, sorted by composite score descending.
    pub all: Vec<RankedFlight>,
    /// Global minimum-price offer.
    pub cheapest: Option<RankedFlight>,
    /// Minimum duration among nonstop offers, else global minimum.
    pub shortest: Option<RankedFlight>,
    /// Maximum composite among nonstop offers, else global maximum.
    pub most_convenient: Option<RankedFlight>,
}

/// Scores, orders, and categorizes candidate offers.
///
/// Degenerate inputs never fail: an empty slice produces an empty list
/// and three `None` categories; a singleton makes all three categories
/// point at that one offer. Category picks may share an underlying offer;
/// deduplication is a presentation concern, not the engine's.
pub fn rank(
    offers: &[FlightOffer],
    preference: Option<Preference>,
    config: &RankingConfig,
) -> RankingOutcome {
    if offers.is_empty() {
        return RankingOutcome { all: vec![], cheapest: None, shortest: None, most_convenient: None };
    }

    let weights = config.weights_for(preference);
    let scored: Vec<(f64, &FlightOffer)> = offers
        .iter()
        .map(|offer| (SubScores::compute(offer, config).composite(weights), offer))
        .collect();

    let mut order: Vec<usize> = (0..scored.len()).collect();
    order.sort_by(|&a, &b| compare_scored(&scored[a], &scored[b]));

    let min_price = scored
        .iter()
        .map(|(_, o)| o.price)
        .fold(f64::INFINITY, f64::min);
    let min_duration = scored.iter().map(|(_, o)| o.duration_minutes).min();

    // Category picks are computed over the unsorted input, independent of
    // the ranking list order.
    let cheapest_idx = pick(&scored, |a, b| {
        a.1.price
            .total_cmp(&b.1.price)
            .then_with(|| tie_break(a.1, b.1))
    });
    let shortest_idx = pick_preferring_nonstop(&scored, |a, b| {
        a.1.duration_minutes
            .cmp(&b.1.duration_minutes)
            .then_with(|| tie_break(a.1, b.1))
    });
    let most_convenient_idx = pick_preferring_nonstop(&scored, |a, b| {
        b.0.total_cmp(&a.0).then_with(|| tie_break(a.1, b.1))
    });

    let category_of = |idx: usize| -> Option<Category> {
        // An offer can hold several categories; the list annotation keeps
        // the strongest one in Cheapest > Shortest > MostConvenient order.
        if idx == cheapest_idx {
            Some(Category::Cheapest)
        } else if idx == shortest_idx {
            Some(Category::Shortest)
        } else if idx == most_convenient_idx {
            Some(Category::MostConvenient)
        } else {
            None
        }
    };

    let ranked_at = |idx: usize, rank_pos: u32, category: Option<Category>| -> RankedFlight {
        let (score, offer) = &scored[idx];
        let mut badges = Vec::new();
        if offer.price == min_price {
            badges.push(Badge::CheapestInSet);
        }
        if Some(offer.duration_minutes) == min_duration {
            badges.push(Badge::FastestInSet);
        }
        if offer.is_nonstop() {
            badges.push(Badge::Direct);
        }
        if rank_pos <= 3 {
            badges.push(Badge::TopPick);
        }
        RankedFlight {
            offer: (*offer).clone(),
            score: *score,
            rank: rank_pos,
            category,
            badges,
        }
    };

    let rank_of = |idx: usize| -> u32 {
        order.iter().position(|&i| i == idx).map(|p| p as u32 + 1).unwrap_or(0)
    };

    let all: Vec<RankedFlight> = order
        .iter()
        .enumerate()
        .map(|(pos, &idx)| ranked_at(idx, pos as u32 + 1, category_of(idx)))
        .collect();

    RankingOutcome {
        cheapest: Some(ranked_at(cheapest_idx, rank_of(cheapest_idx), Some(Category::Cheapest))),
        shortest: Some(ranked_at(shortest_idx, rank_of(shortest_idx), Some(Category::Shortest))),
        most_convenient: Some(ranked_at(
            most_convenient_idx,
            rank_of(most_convenient_idx),
            Some(Category::MostConvenient),
        )),
        all,
    }
}

fn compare_scored(a: &(f64, &FlightOffer), b: &(f64, &FlightOffer)) -> Ordering {
    b.0.total_cmp(&a.0).then_with(|| tie_break(a.1, b.1))
}

/// Deterministic tie-break: ascending price, ascending duration, lexical
/// carrier code.
fn tie_break(a: &FlightOffer, b: &FlightOffer) -> Ordering {
    a.price
        .total_cmp(&b.price)
        .then_with(|| a.duration_minutes.cmp(&b.duration_minutes))
        .then_with(|| a.carrier_code.cmp(&b.carrier_code))
}

fn pick<F>(scored: &[(f64, &FlightOffer)], mut better: F) -> usize
where
    F: FnMut(&(f64, &FlightOffer), &(f64, &FlightOffer)) -> Ordering,
{
    let mut best = 0;
    for idx in 1..scored.len() {
        if better(&scored[idx], &scored[best]) == Ordering::Less {
            best = idx;
        }
    }
    best
}

/// Picks over nonstop offers when any exist, falling back to the whole set.
fn pick_preferring_nonstop<F>(scored: &[(f64, &FlightOffer)], mut better: F) -> usize
where
    F: FnMut(&(f64, &FlightOffer), &(f64, &FlightOffer)) -> Ordering,
{
    let nonstop: Vec<usize> = scored
        .iter()
        .enumerate()
        .filter(|(_, (_, o))| o.is_nonstop())
        .map(|(i, _)| i)
        .collect();

    let pool: Vec<usize> = if nonstop.is_empty() {
        (0..scored.len()).collect()
    } else {
        nonstop
    };

    let mut best = pool[0];
    for &idx in &pool[1..] {
        if better(&scored[idx], &scored[best]) == Ordering::Less {
            best = idx;
        }
    }
    best
}
