//! Daily 4-number draw.
//!
//! A reproducible function of (name, date of birth, calendar day). The seed
//! combines the day of the year, the life path number, and the sum of the
//! name's character codes; a linear congruential generator then walks from
//! that seed until four distinct values in `1..=69` have been produced.

use chrono::Datelike;
use serde::Serialize;

use crate::error::CoreError;
use crate::identity::IdentityInput;
use crate::numerology::life_path_number;
use crate::types::CalendarDate;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Number of values in a daily draw.
pub const DRAW_SIZE: usize = 4;

/// Largest value a draw may contain (values are `1..=DRAW_MAX`).
pub const DRAW_MAX: u64 = 69;

/// Seeds are taken modulo this value before the generator starts.
pub const SEED_MODULUS: u64 = 10_000;

/// LCG multiplier.
pub const LCG_MULTIPLIER: u64 = 9301;
/// LCG increment.
pub const LCG_INCREMENT: u64 = 49_297;
/// LCG modulus.
pub const LCG_MODULUS: u64 = 233_280;

/// Upper bound on generator steps before the draw is declared exhausted.
pub const MAX_DRAW_ITERATIONS: u32 = 1000;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Four distinct values in `1..=69`, ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DailyDraw([u8; DRAW_SIZE]);

impl DailyDraw {
    pub fn numbers(&self) -> &[u8; DRAW_SIZE] {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Sum of the Unicode scalar values of every character in `name`.
pub fn name_char_sum(name: &str) -> u64 {
    name.chars().map(|c| u64::from(u32::from(c))).sum()
}

/// Seed for a given identity and day, in `0..SEED_MODULUS`.
pub fn draw_seed(dob: CalendarDate, name: &str, today: CalendarDate) -> u64 {
    let day_of_year = u64::from(today.ordinal());
    let life_path = u64::from(life_path_number(dob));
    (day_of_year * 1000 + life_path * 100 + name_char_sum(name)) % SEED_MODULUS
}

/// One LCG step.
fn next_seed(seed: u64) -> u64 {
    (seed * LCG_MULTIPLIER + LCG_INCREMENT) % LCG_MODULUS
}

/// Walk the generator from `seed`, keeping the first four distinct values.
///
/// Fails with [`CoreError::DrawExhausted`] if `max_iterations` steps do not
/// produce enough distinct values.
pub fn draw_from_seed(seed: u64, max_iterations: u32) -> Result<DailyDraw, CoreError> {
    let mut seed = seed;
    let mut values: Vec<u8> = Vec::with_capacity(DRAW_SIZE);

    for _ in 0..max_iterations {
        seed = next_seed(seed);
        // Always in 1..=69, fits in u8.
        let value = (seed % DRAW_MAX + 1) as u8;
        if !values.contains(&value) {
            values.push(value);
            if values.len() == DRAW_SIZE {
                values.sort_unstable();
                let mut numbers = [0u8; DRAW_SIZE];
                numbers.copy_from_slice(&values);
                return Ok(DailyDraw(numbers));
            }
        }
    }

    Err(CoreError::DrawExhausted {
        attempts: max_iterations,
        found: values.len(),
    })
}

/// The daily draw for an identity on `today`.
pub fn daily_lucky_numbers(
    dob: CalendarDate,
    name: &str,
    today: CalendarDate,
) -> Result<DailyDraw, CoreError> {
    draw_from_seed(draw_seed(dob, name, today), MAX_DRAW_ITERATIONS)
}

/// Convenience wrapper over [`daily_lucky_numbers`] for an [`IdentityInput`].
pub fn daily_draw_for(
    identity: &IdentityInput,
    today: CalendarDate,
) -> Result<DailyDraw, CoreError> {
    daily_lucky_numbers(identity.date_of_birth, &identity.name, today)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
