//! Server-sourced lottery combinations (5 white balls + 1 powerball).
//!
//! The engine never generates these; the remote luck service does. They are
//! validated on construction and on deserialization, so any [`Combination`]
//! value that exists has a correct shape and can be cached as-is.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Number of white balls in a combination.
pub const WHITE_BALL_COUNT: usize = 5;

/// White balls are drawn from `1..=WHITE_BALL_MAX`.
pub const WHITE_BALL_MAX: u8 = 69;

/// The powerball is drawn from `1..=POWERBALL_MAX`.
pub const POWERBALL_MAX: u8 = 26;

// ---------------------------------------------------------------------------
// Combination
// ---------------------------------------------------------------------------

/// Unvalidated wire shape. Extra server fields (`type`, `index`) are ignored.
#[derive(Debug, Deserialize)]
struct RawCombination {
    white_balls: Vec<u8>,
    powerball: u8,
}

/// Five distinct white balls (ascending) and one powerball.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCombination")]
pub struct Combination {
    white_balls: [u8; WHITE_BALL_COUNT],
    powerball: u8,
}

impl Combination {
    /// Validate and build a combination. White balls may arrive in any
    /// order; they are stored ascending.
    pub fn new(white_balls: &[u8], powerball: u8) -> Result<Self, CoreError> {
        if white_balls.len() != WHITE_BALL_COUNT {
            return Err(CoreError::Validation(format!(
                "Combination must have exactly {WHITE_BALL_COUNT} white balls, got {}",
                white_balls.len()
            )));
        }

        if let Some(bad) = white_balls
            .iter()
            .find(|b| !(1..=WHITE_BALL_MAX).contains(*b))
        {
            return Err(CoreError::Validation(format!(
                "White ball {bad} is outside 1..={WHITE_BALL_MAX}"
            )));
        }

        let mut sorted = [0u8; WHITE_BALL_COUNT];
        sorted.copy_from_slice(white_balls);
        sorted.sort_unstable();
        if sorted.windows(2).any(|w| w[0] == w[1]) {
            return Err(CoreError::Validation(format!(
                "White balls must be distinct, got {white_balls:?}"
            )));
        }

        if !(1..=POWERBALL_MAX).contains(&powerball) {
            return Err(CoreError::Validation(format!(
                "Powerball {powerball} is outside 1..={POWERBALL_MAX}"
            )));
        }

        Ok(Self {
            white_balls: sorted,
            powerball,
        })
    }

    pub fn white_balls(&self) -> &[u8; WHITE_BALL_COUNT] {
        &self.white_balls
    }

    pub fn powerball(&self) -> u8 {
        self.powerball
    }
}

impl TryFrom<RawCombination> for Combination {
    type Error = CoreError;

    fn try_from(raw: RawCombination) -> Result<Self, Self::Error> {
        Self::new(&raw.white_balls, raw.powerball)
    }
}

// ---------------------------------------------------------------------------
// LotteryNumbers
// ---------------------------------------------------------------------------

/// The remote service's lottery payload: one personal combination plus the
/// day's combinations. Field names match the service and the persisted layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotteryNumbers {
    pub personal_powerball: Combination,
    #[serde(default)]
    pub daily_powerballs: Vec<Combination>,
}

impl LotteryNumbers {
    pub fn new(personal_powerball: Combination, daily_powerballs: Vec<Combination>) -> Self {
        Self {
            personal_powerball,
            daily_powerballs,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Combination::new --

    #[test]
    fn valid_combination_is_sorted() {
        let c = Combination::new(&[54, 3, 41, 18, 36], 7).unwrap();
        assert_eq!(c.white_balls(), &[3, 18, 36, 41, 54]);
        assert_eq!(c.powerball(), 7);
    }

    #[test]
    fn boundaries_are_accepted() {
        assert!(Combination::new(&[1, 2, 3, 4, 69], 1).is_ok());
        assert!(Combination::new(&[1, 2, 3, 4, 5], 26).is_ok());
    }

    #[test]
    fn wrong_count_is_rejected() {
        assert!(Combination::new(&[1, 2, 3, 4], 1).is_err());
        assert!(Combination::new(&[1, 2, 3, 4, 5, 6], 1).is_err());
        assert!(Combination::new(&[], 1).is_err());
    }

    #[test]
    fn out_of_range_white_ball_is_rejected() {
        let msg = Combination::new(&[0, 2, 3, 4, 5], 1).unwrap_err().to_string();
        assert!(msg.contains('0'));
        assert!(Combination::new(&[1, 2, 3, 4, 70], 1).is_err());
    }

    #[test]
    fn duplicate_white_balls_are_rejected() {
        let msg = Combination::new(&[5, 2, 3, 4, 5], 1).unwrap_err().to_string();
        assert!(msg.contains("distinct"));
    }

    #[test]
    fn powerball_range_is_enforced() {
        assert!(Combination::new(&[1, 2, 3, 4, 5], 0).is_err());
        assert!(Combination::new(&[1, 2, 3, 4, 5], 27).is_err());
    }

    // -- serde --

    #[test]
    fn deserializes_service_payload_ignoring_extra_fields() {
        let json = serde_json::json!({
            "white_balls": [36, 3, 18, 41, 54],
            "powerball": 7,
            "type": "daily",
            "index": 3
        });
        let c: Combination = serde_json::from_value(json).unwrap();
        assert_eq!(c.white_balls(), &[3, 18, 36, 41, 54]);
    }

    #[test]
    fn invalid_payload_fails_to_deserialize() {
        let json = serde_json::json!({ "white_balls": [1, 1, 2, 3, 4], "powerball": 7 });
        assert!(serde_json::from_value::<Combination>(json).is_err());

        let json = serde_json::json!({ "white_balls": [1, 2, 3, 4, 5], "powerball": 40 });
        assert!(serde_json::from_value::<Combination>(json).is_err());
    }

    #[test]
    fn serializes_with_service_field_names() {
        let c = Combination::new(&[1, 2, 3, 4, 5], 6).unwrap();
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["white_balls"], serde_json::json!([1, 2, 3, 4, 5]));
        assert_eq!(json["powerball"], 6);
    }

    #[test]
    fn lottery_numbers_default_to_no_daily_combinations() {
        let json = serde_json::json!({
            "personal_powerball": { "white_balls": [1, 2, 3, 4, 5], "powerball": 6 }
        });
        let numbers: LotteryNumbers = serde_json::from_value(json).unwrap();
        assert!(numbers.daily_powerballs.is_empty());
    }

    #[test]
    fn lottery_numbers_reject_any_invalid_daily_combination() {
        let json = serde_json::json!({
            "personal_powerball": { "white_balls": [1, 2, 3, 4, 5], "powerball": 6 },
            "daily_powerballs": [
                { "white_balls": [1, 2, 3, 4, 5], "powerball": 6 },
                { "white_balls": [1, 2, 3, 4], "powerball": 6 }
            ]
        });
        assert!(serde_json::from_value::<LotteryNumbers>(json).is_err());
    }
}
