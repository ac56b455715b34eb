//! Single-utterance route matching.
//!
//! A first message like "from mumbai to delhi on 25 dec" can fill several
//! slots at once. Matchers are tried in order and the first hit wins; the
//! captured fragments stay raw text here, resolution happens in the
//! manager.

use once_cell::sync::Lazy;
use regex::Regex;

/// Raw route fragments pulled from one utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteUtterance {
    pub origin_raw: String,
    pub destination_raw: String,
    pub date_raw: Option<String>,
}

/// A pattern that may pull a whole route out of one message.
pub trait UtteranceMatcher: Send + Sync {
    /// Matcher name, for trace logs.
    fn name(&self) -> &'static str;

    /// Returns the route fragments if this matcher applies.
    fn try_match(&self, message: &str) -> Option<RouteUtterance>;
}

/// "from X to Y [on D]"
pub struct FromToMatcher;

static FROM_TO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bfrom\s+(?P<origin>.+?)\s+to\s+(?P<dest>.+?)(?:\s+on\s+(?P<date>.+?))?\s*$")
        .unwrap_or_else(|e| panic!("from-to pattern: {e}"))
});

impl UtteranceMatcher for FromToMatcher {
    fn name(&self) -> &'static str {
        "from_to"
    }

    fn try_match(&self, message: &str) -> Option<RouteUtterance> {
        let caps = FROM_TO.captures(message.trim())?;
        Some(RouteUtterance {
            origin_raw: caps["origin"].trim().to_string(),
            destination_raw: caps["dest"].trim().to_string(),
            date_raw: caps.name("date").map(|m| m.as_str().trim().to_string()),
        })
    }
}

/// "X to Y [on D]" without a leading "from".
pub struct RouteToMatcher;

static ROUTE_TO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?P<origin>.+?)\s+to\s+(?P<dest>.+?)(?:\s+on\s+(?P<date>.+?))?\s*$")
        .unwrap_or_else(|e| panic!("route-to pattern: {e}"))
});

impl UtteranceMatcher for RouteToMatcher {
    fn name(&self) -> &'static str {
        "route_to"
    }

    fn try_match(&self, message: &str) -> Option<RouteUtterance> {
        let caps = ROUTE_TO.captures(message.trim())?;
        Some(RouteUtterance {
            origin_raw: caps["origin"].trim().to_string(),
            destination_raw: caps["dest"].trim().to_string(),
            date_raw: caps.name("date").map(|m| m.as_str().trim().to_string()),
        })
    }
}

/// "X -> Y [on D]" or "X → Y [on D]".
pub struct ArrowMatcher;

static ARROW: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?P<origin>.+?)\s*(?:->|→)\s*(?P<dest>.+?)(?:\s+on\s+(?P<date>.+?))?\s*$")
        .unwrap_or_else(|e| panic!("arrow pattern: {e}"))
});

impl UtteranceMatcher for ArrowMatcher {
    fn name(&self) -> &'static str {
        "arrow"
    }

    fn try_match(&self, message: &str) -> Option<RouteUtterance> {
        let caps = ARROW.captures(message.trim())?;
        Some(RouteUtterance {
            origin_raw: caps["origin"].trim().to_string(),
            destination_raw: caps["dest"].trim().to_string(),
            date_raw: caps.name("date").map(|m| m.as_str().trim().to_string()),
        })
    }
}

/// The matchers in precedence order. Arrow runs before the bare "X to Y"
/// form so "BOM -> DEL" is not misread as an origin called "BOM ->".
pub fn matcher_cascade() -> Vec<Box<dyn UtteranceMatcher>> {
    vec![Box::new(FromToMatcher), Box::new(ArrowMatcher), Box::new(RouteToMatcher)]
}

/// Runs the cascade, returning the first match.
pub fn match_route(message: &str) -> Option<RouteUtterance> {
    matcher_cascade().iter().find_map(|m| m.try_match(message))
}
