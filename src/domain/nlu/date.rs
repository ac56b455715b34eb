//! Free-text travel date parsing.
//!
//! Resolves natural-language date expressions to canonical dates through an
//! ordered list of recognizers; the first recognizer that matches wins and
//! no partial scoring is done. Day-only input ("25", "25th") is always
//! resolvable but flagged `inferred`, which sends the dialogue through the
//! confirmation sub-flow.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::foundation::ValidationError;

/// A resolved travel date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedDate {
    /// The canonical date.
    pub iso: NaiveDate,
    /// True when the date was inferred from partial input and needs
    /// user confirmation.
    pub inferred: bool,
}

impl ParsedDate {
    fn exact(iso: NaiveDate) -> Self {
        Self { iso, inferred: false }
    }

    fn inferred(iso: NaiveDate) -> Self {
        Self { iso, inferred: true }
    }
}

static DAY_ONLY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})(?:st|nd|rd|th)?$").unwrap());

static IN_N_UNITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bin\s+(\d{1,3})\s+(day|week|month)s?\b").unwrap());

static WEEKDAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:(next|this)\s+)?(monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b")
        .unwrap()
});

/// Explicit formats tried in order with strict parsing; first valid wins.
const EXPLICIT_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d %Y",
    "%B %d %Y",
];

/// Year-less explicit formats; a past resolution rolls to next year.
const YEARLESS_FORMATS: &[&str] = &["%d %b", "%d %B", "%b %d", "%B %d", "%d/%m"];

/// Rule-based parser for free-text travel dates.
///
/// Stateless and deterministic: the reference date is always passed in,
/// so tests can pin "today" without touching the clock.
#[derive(Debug, Clone, Default)]
pub struct DateParser;

impl DateParser {
    pub fn new() -> Self {
        Self
    }

    /// Parses a free-text date expression against a reference date.
    ///
    /// Recognition order: fixed keywords, weekday expressions,
    /// "in N days/weeks/months", day-only partials, then explicit formats.
    /// Any resolution strictly before `today` yields `None`; same-day
    /// resolutions are only reachable through the `today` keyword.
    pub fn parse(&self, raw: &str, today: NaiveDate) -> Option<ParsedDate> {
        let text = normalize(raw);
        if text.is_empty() {
            return None;
        }

        if let Some(parsed) = self.parse_keyword(&text, today) {
            return Some(parsed);
        }
        if let Some(parsed) = self.parse_weekday(&text, today) {
            return self.guard_future(parsed, today);
        }
        if let Some(parsed) = self.parse_relative_offset(&text, today) {
            return self.guard_future(parsed, today);
        }
        if let Some(parsed) = self.parse_day_only(&text, today) {
            return self.guard_future(parsed, today);
        }
        if let Some(parsed) = self.parse_explicit(&text, today) {
            return self.guard_future(parsed, today);
        }

        None
    }

    /// Like [`DateParser::parse`], but reports why resolution failed so
    /// error replies can tell a past date, a same-day expression, and
    /// unreadable text apart.
    pub fn parse_checked(
        &self,
        raw: &str,
        today: NaiveDate,
    ) -> Result<ParsedDate, ValidationError> {
        if let Some(parsed) = self.parse(raw, today) {
            return Ok(parsed);
        }
        match self.recognize(raw, today) {
            Some(parsed) if parsed.iso == today => {
                Err(ValidationError::same_day(parsed.iso.to_string()))
            }
            Some(parsed) => Err(ValidationError::past_date(parsed.iso.to_string())),
            None => Err(ValidationError::unparseable_date(raw)),
        }
    }

    /// Runs the recognizer cascade without the future guard.
    fn recognize(&self, raw: &str, today: NaiveDate) -> Option<ParsedDate> {
        let text = normalize(raw);
        if text.is_empty() {
            return None;
        }
        self.parse_keyword(&text, today)
            .or_else(|| self.parse_weekday(&text, today))
            .or_else(|| self.parse_relative_offset(&text, today))
            .or_else(|| self.parse_day_only(&text, today))
            .or_else(|| self.parse_explicit(&text, today))
    }

    /// Rejects resolutions that are not strictly in the future. The
    /// `today` keyword path bypasses this, making it the only way to
    /// book a same-day flight.
    fn guard_future(&self, parsed: ParsedDate, today: NaiveDate) -> Option<ParsedDate> {
        if parsed.iso > today {
            Some(parsed)
        } else {
            None
        }
    }

    fn parse_keyword(&self, text: &str, today: NaiveDate) -> Option<ParsedDate> {
        // Fold hyphens here only; explicit formats like 2025-12-25 need them.
        let text = text.replace('-', " ");
        let text = text.as_str();
        if text.contains("day after tomorrow") {
            return Some(ParsedDate::exact(today + Duration::days(2)));
        }
        if text.contains("tomorrow") {
            return Some(ParsedDate::exact(today + Duration::days(1)));
        }
        if text.contains("today") {
            return Some(ParsedDate::exact(today));
        }
        if text.contains("next week") {
            return Some(ParsedDate::exact(today + Duration::days(7)));
        }
        if text.contains("next month") {
            return Some(ParsedDate::exact(first_of_next_month(today)));
        }
        if text.contains("next year") {
            let next = NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)?;
            return Some(ParsedDate::exact(next));
        }
        None
    }

    fn parse_weekday(&self, text: &str, today: NaiveDate) -> Option<ParsedDate> {
        let caps = WEEKDAY.captures(text)?;
        let qualifier = caps.get(1).map(|m| m.as_str());
        let target = weekday_from_name(caps.get(2)?.as_str())?;

        let base = (target.num_days_from_monday() as i64
            - today.weekday().num_days_from_monday() as i64)
            .rem_euclid(7);

        let days = match qualifier {
            // Strictly the next occurrence at least a week out.
            Some("next") => {
                if base == 0 {
                    7
                } else {
                    base + 7
                }
            }
            // Nearest upcoming occurrence, rolling to next week when the
            // weekday has already passed (the current day counts as passed).
            _ => {
                if base == 0 {
                    7
                } else {
                    base
                }
            }
        };

        Some(ParsedDate::exact(today + Duration::days(days)))
    }

    fn parse_relative_offset(&self, text: &str, today: NaiveDate) -> Option<ParsedDate> {
        let caps = IN_N_UNITS.captures(text)?;
        let n: i64 = caps.get(1)?.as_str().parse().ok()?;
        let date = match caps.get(2)?.as_str() {
            "day" => today + Duration::days(n),
            "week" => today + Duration::days(7 * n),
            "month" => add_months_clamped(today, n as i32)?,
            _ => return None,
        };
        Some(ParsedDate::exact(date))
    }

    /// Day-only partials always resolve: current month if the day is still
    /// ahead, else next month, else the same month next year.
    fn parse_day_only(&self, text: &str, today: NaiveDate) -> Option<ParsedDate> {
        let caps = DAY_ONLY.captures(text)?;
        let day: u32 = caps.get(1)?.as_str().parse().ok()?;
        if !(1..=31).contains(&day) {
            return None;
        }

        if let Some(date) = NaiveDate::from_ymd_opt(today.year(), today.month(), day) {
            if date > today {
                return Some(ParsedDate::inferred(date));
            }
        }

        let next_month = first_of_next_month(today);
        if let Some(date) = NaiveDate::from_ymd_opt(next_month.year(), next_month.month(), day) {
            return Some(ParsedDate::inferred(date));
        }

        NaiveDate::from_ymd_opt(today.year() + 1, today.month(), day).map(ParsedDate::inferred)
    }

    fn parse_explicit(&self, text: &str, today: NaiveDate) -> Option<ParsedDate> {
        for format in EXPLICIT_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(text, format) {
                return Some(ParsedDate::exact(date));
            }
        }

        // Year-less forms name an exact day, so they are not "inferred";
        // a date already behind us rolls to next year.
        for format in YEARLESS_FORMATS {
            let with_year = format!("{} {}", text, today.year());
            let full_format = format!("{} %Y", format);
            if let Ok(date) = NaiveDate::parse_from_str(&with_year, &full_format) {
                if date <= today {
                    let rolled =
                        NaiveDate::from_ymd_opt(date.year() + 1, date.month(), date.day())?;
                    return Some(ParsedDate::exact(rolled));
                }
                return Some(ParsedDate::exact(date));
            }
        }

        None
    }
}

/// Alternatives offered alongside an inferred date in the confirmation
/// sub-flow: same day next month, same day next year, the day before, and
/// the day after - keeping only real future dates, at most four.
pub fn confirmation_alternatives(inferred: NaiveDate, today: NaiveDate) -> Vec<NaiveDate> {
    let candidates = [
        same_day_next_month(inferred),
        NaiveDate::from_ymd_opt(inferred.year() + 1, inferred.month(), inferred.day()),
        inferred.pred_opt(),
        inferred.succ_opt(),
    ];

    candidates
        .into_iter()
        .flatten()
        .filter(|d| *d >= today && *d != inferred)
        .take(4)
        .collect()
}

fn normalize(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .replace(',', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn weekday_from_name(name: &str) -> Option<Weekday> {
    let weekday = match name {
        "monday" => Weekday::Mon,
        "tuesday" => Weekday::Tue,
        "wednesday" => Weekday::Wed,
        "thursday" => Weekday::Thu,
        "friday" => Weekday::Fri,
        "saturday" => Weekday::Sat,
        "sunday" => Weekday::Sun,
        _ => return None,
    };
    Some(weekday)
}

fn first_of_next_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    // The first of a month always exists.
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}

fn same_day_next_month(date: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, date.day())
}

/// Adds calendar months, clamping the day to the end of the target month.
fn add_months_clamped(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    let total = date.year() * 12 + date.month() as i32 - 1 + months;
    let year = total.div_euclid(12);
    let month = (total.rem_euclid(12) + 1) as u32;
    let mut day = date.day();
    while day > 28 {
        if let Some(d) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(d);
        }
        day -= 1;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}
