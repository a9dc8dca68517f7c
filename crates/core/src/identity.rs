//! Identity input (name + date of birth) and lenient normalization.
//!
//! The engine never rejects a malformed identity. Raw strings coming from a
//! profile or form are normalized here, substituting [`DEFAULT_NAME`] and
//! [`DEFAULT_DOB`] so that something is always shown. Strict validators are
//! provided for callers that prefer to reject bad input up front.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::CalendarDate;

/// Name substituted when the raw name is empty or whitespace.
pub const DEFAULT_NAME: &str = "User";

/// Date of birth substituted when the raw value does not parse.
pub const DEFAULT_DOB: &str = "2000-01-01";

/// Accepted date-of-birth format (ISO-8601 calendar date).
pub const DOB_FORMAT: &str = "%Y-%m-%d";

/// Immutable identity used by every numerology calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityInput {
    pub name: String,
    pub date_of_birth: CalendarDate,
}

/// Result of [`IdentityInput::from_raw`], recording which fields fell back
/// to their defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedIdentity {
    pub identity: IdentityInput,
    pub name_defaulted: bool,
    pub dob_defaulted: bool,
}

impl NormalizedIdentity {
    /// Returns `true` if any field was replaced by a default.
    pub fn used_fallback(&self) -> bool {
        self.name_defaulted || self.dob_defaulted
    }
}

impl IdentityInput {
    /// Build an identity from already-validated parts.
    pub fn new(name: impl Into<String>, date_of_birth: CalendarDate) -> Self {
        Self {
            name: name.into(),
            date_of_birth,
        }
    }

    /// Normalize raw user input, never failing.
    ///
    /// The name is trimmed; an empty result becomes [`DEFAULT_NAME`]. The
    /// date must be `YYYY-MM-DD`; anything else becomes [`DEFAULT_DOB`].
    pub fn from_raw(name: &str, dob: &str) -> NormalizedIdentity {
        let (name, name_defaulted) = match validate_name(name) {
            Ok(trimmed) => (trimmed.to_string(), false),
            Err(_) => (DEFAULT_NAME.to_string(), true),
        };

        let (date_of_birth, dob_defaulted) = match parse_dob(dob) {
            Ok(date) => (date, false),
            Err(_) => (default_dob(), true),
        };

        NormalizedIdentity {
            identity: Self {
                name,
                date_of_birth,
            },
            name_defaulted,
            dob_defaulted,
        }
    }

    /// The guest identity used when no profile is available.
    pub fn guest() -> Self {
        Self::new(DEFAULT_NAME, default_dob())
    }

    /// Date of birth rendered in [`DOB_FORMAT`].
    pub fn dob_string(&self) -> String {
        self.date_of_birth.format(DOB_FORMAT).to_string()
    }
}

/// Validate that a name is non-empty after trimming and return the trimmed slice.
pub fn validate_name(name: &str) -> Result<&str, CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Err(CoreError::Validation("Name must not be empty".to_string()))
    } else {
        Ok(trimmed)
    }
}

/// Parse a `YYYY-MM-DD` date of birth.
pub fn parse_dob(dob: &str) -> Result<CalendarDate, CoreError> {
    NaiveDate::parse_from_str(dob.trim(), DOB_FORMAT).map_err(|e| {
        CoreError::Validation(format!(
            "Invalid date of birth '{dob}': expected YYYY-MM-DD ({e})"
        ))
    })
}

fn default_dob() -> CalendarDate {
    // 2000-01-01 is always a valid Gregorian date.
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> CalendarDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // -- from_raw --

    #[test]
    fn well_formed_input_is_kept() {
        let n = IdentityInput::from_raw("Ada Lovelace", "1815-12-10");
        assert_eq!(n.identity.name, "Ada Lovelace");
        assert_eq!(n.identity.date_of_birth, date(1815, 12, 10));
        assert!(!n.used_fallback());
    }

    #[test]
    fn name_is_trimmed() {
        let n = IdentityInput::from_raw("  Ada  ", "1990-01-01");
        assert_eq!(n.identity.name, "Ada");
        assert!(!n.name_defaulted);
    }

    #[test]
    fn empty_name_falls_back_to_user() {
        let n = IdentityInput::from_raw("   ", "1990-01-01");
        assert_eq!(n.identity.name, DEFAULT_NAME);
        assert!(n.name_defaulted);
        assert!(!n.dob_defaulted);
    }

    #[test]
    fn malformed_dob_falls_back_to_default() {
        for raw in ["", "01/02/1990", "1990-13-01", "1990-02-30", "yesterday"] {
            let n = IdentityInput::from_raw("Ada", raw);
            assert_eq!(n.identity.date_of_birth, date(2000, 1, 1), "input {raw:?}");
            assert!(n.dob_defaulted);
        }
    }

    #[test]
    fn guest_matches_defaults() {
        let guest = IdentityInput::guest();
        assert_eq!(guest.name, DEFAULT_NAME);
        assert_eq!(guest.dob_string(), DEFAULT_DOB);
    }

    // -- strict validators --

    #[test]
    fn validate_name_rejects_blank() {
        assert!(validate_name("").is_err());
        assert!(validate_name("\t\n").is_err());
        assert_eq!(validate_name(" Bo ").unwrap(), "Bo");
    }

    #[test]
    fn parse_dob_error_mentions_input() {
        let msg = parse_dob("31-12-1999").unwrap_err().to_string();
        assert!(msg.contains("31-12-1999"));
    }

    #[test]
    fn dob_string_is_zero_padded() {
        let id = IdentityInput::new("Ada", date(1990, 1, 5));
        assert_eq!(id.dob_string(), "1990-01-05");
    }
}
