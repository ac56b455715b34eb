//! Error types for the domain layer.
//!
//! `ValidationError` covers locally recoverable slot failures: the dialogue
//! manager answers them with a same-state re-prompt, never an error to the
//! caller. `DomainError` carries coded failures across layer boundaries.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Why a user-provided date could not be accepted.
///
/// Every variant is recovered in-dialogue by re-prompting; none of them
/// escape the turn as a system-level error. City and preference failures
/// carry no structured cause, so they are answered directly with prompt
/// text and never pass through here.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Could not parse '{raw}' as a travel date")]
    UnparseableDate { raw: String },

    #[error("Travel date {iso} is in the past")]
    PastDate { iso: String },

    #[error("Travel date {iso} is today; only the word 'today' books same-day")]
    SameDay { iso: String },
}

impl ValidationError {
    /// Creates an unparseable date error.
    pub fn unparseable_date(raw: impl Into<String>) -> Self {
        ValidationError::UnparseableDate { raw: raw.into() }
    }

    /// Creates a past date error.
    pub fn past_date(iso: impl Into<String>) -> Self {
        ValidationError::PastDate { iso: iso.into() }
    }

    /// Creates a same-day date error.
    pub fn same_day(iso: impl Into<String>) -> Self {
        ValidationError::SameDay { iso: iso.into() }
    }
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,
    InvalidFormat,

    // State errors
    InvalidStateTransition,
    CorruptContext,

    // Collaborator errors
    SourceUnavailable,
    SessionStoreError,

    // Infrastructure errors
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::InvalidFormat => "INVALID_FORMAT",
            ErrorCode::InvalidStateTransition => "INVALID_STATE_TRANSITION",
            ErrorCode::CorruptContext => "CORRUPT_CONTEXT",
            ErrorCode::SourceUnavailable => "SOURCE_UNAVAILABLE",
            ErrorCode::SessionStoreError => "SESSION_STORE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a corrupt-context error, fatal only to the current turn.
    pub fn corrupt_context(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::CorruptContext, message)
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unparseable_date_displays_raw_input() {
        let err = ValidationError::unparseable_date("someday");
        assert_eq!(format!("{}", err), "Could not parse 'someday' as a travel date");
    }

    #[test]
    fn past_and_same_day_are_distinct_errors() {
        assert_ne!(
            ValidationError::past_date("2025-12-09"),
            ValidationError::same_day("2025-12-09")
        );
    }

    #[test]
    fn domain_error_displays_code_and_message() {
        let err = DomainError::new(ErrorCode::SourceUnavailable, "flight source timed out");
        assert_eq!(format!("{}", err), "[SOURCE_UNAVAILABLE] flight source timed out");
    }

    #[test]
    fn domain_error_with_detail_adds_detail() {
        let err = DomainError::corrupt_context("missing step field")
            .with_detail("session_id", "abc")
            .with_detail("field", "step");

        assert_eq!(err.code, ErrorCode::CorruptContext);
        assert_eq!(err.details.get("field"), Some(&"step".to_string()));
    }

    #[test]
    fn error_code_display_formats_correctly() {
        assert_eq!(format!("{}", ErrorCode::CorruptContext), "CORRUPT_CONTEXT");
        assert_eq!(format!("{}", ErrorCode::SourceUnavailable), "SOURCE_UNAVAILABLE");
    }
}
