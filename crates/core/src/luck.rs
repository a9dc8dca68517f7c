//! Daily luck indicators: lucky percentage, personal day number, and the
//! numerology daily score.
//!
//! Like the rest of the engine these are deterministic in (identity, day).

use chrono::Datelike;
use serde::Serialize;

use crate::identity::IdentityInput;
use crate::numerology::{is_master_number, name_letter_sum, reduce_to_single_digit};
use crate::types::CalendarDate;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Initial value of the djb2 string hash.
const DJB2_SEED: i64 = 5381;

/// Percentages are taken modulo this value, giving `0..=100`.
const PERCENT_MODULUS: u64 = 101;

/// Neutral starting point of the daily score.
pub const BASE_SCORE: i32 = 50;
/// Lowest score ever reported.
pub const MIN_SCORE: i32 = 10;
/// Highest score ever reported.
pub const MAX_SCORE: i32 = 100;

// ---------------------------------------------------------------------------
// Lucky percentage
// ---------------------------------------------------------------------------

fn reduce(n: u32) -> u32 {
    reduce_to_single_digit(n, false)
}

/// Life path computed by reducing day, month and year separately before
/// summing. Used only by the lucky percentage.
fn component_life_path(dob: CalendarDate) -> u32 {
    reduce(reduce(dob.day()) + reduce(dob.month()) + reduce(dob.year().unsigned_abs()))
}

/// Sum of ASCII codes of the lowercased name; non-ASCII characters count 0.
fn ascii_name_hash(name: &str) -> u64 {
    name.chars()
        .map(|c| {
            if c.is_ascii() {
                u64::from(c.to_ascii_lowercase() as u8)
            } else {
                0
            }
        })
        .sum()
}

/// djb2 over the bytes of `s` with 64-bit wrapping arithmetic.
fn djb2(s: &str) -> i64 {
    s.bytes().fold(DJB2_SEED, |h, b| {
        (h << 5).wrapping_add(h).wrapping_add(i64::from(b))
    })
}

/// A 0–100 "how lucky is today" figure for an identity.
pub fn lucky_percentage(identity: &IdentityInput, today: CalendarDate) -> u8 {
    let life_path = component_life_path(identity.date_of_birth);
    let name_hash = ascii_name_hash(&identity.name);
    let daily = format!("{}{}{}", today.year(), today.month(), today.day());
    let combined = format!("{life_path}-{name_hash}-{daily}");

    // Always below 101, fits in u8.
    (djb2(&combined).unsigned_abs() % PERCENT_MODULUS) as u8
}

// ---------------------------------------------------------------------------
// Personal day
// ---------------------------------------------------------------------------

/// Personal day number (1–9) for `today`.
///
/// Personal year = birth month + birth day + current year (each reduced);
/// personal day = personal year + current month + current day, reduced.
pub fn personal_day_number(dob: CalendarDate, today: CalendarDate) -> u32 {
    let personal_year =
        reduce(reduce(dob.month()) + reduce(dob.day()) + reduce(today.year().unsigned_abs()));
    reduce(personal_year + reduce(today.month()) + reduce(today.day()))
}

// ---------------------------------------------------------------------------
// Daily score
// ---------------------------------------------------------------------------

/// Life path as the daily score reads it: month, day and year reduced
/// separately, summed, reduced again. Master numbers survive every step.
fn score_life_path(dob: CalendarDate) -> u32 {
    let keep = |n| reduce_to_single_digit(n, true);
    keep(keep(dob.month()) + keep(dob.day()) + keep(dob.year().unsigned_abs()))
}

/// Expression number: every letter of the name counts and master numbers
/// are kept. A name without letters gives 0.
fn expression_number(name: &str) -> u32 {
    reduce_to_single_digit(name_letter_sum(name), true)
}

/// Harmonic group of a number: {1,5,7}, {2,4,8,11,22}, {3,6,9,33}.
fn concord_group(n: u32) -> Option<u8> {
    match n {
        1 | 5 | 7 => Some(1),
        2 | 4 | 8 | 11 | 22 => Some(2),
        3 | 6 | 9 | 33 => Some(3),
        _ => None,
    }
}

/// Points for how well `number` aligns with the personal day.
fn synergy(number: u32, personal_day: u32, points: [i32; 4]) -> i32 {
    let [exact, concord, parity, friction] = points;
    if number == personal_day {
        exact
    } else if concord_group(number) == concord_group(personal_day) {
        concord
    } else if number % 2 == personal_day % 2 {
        parity
    } else {
        friction
    }
}

/// Breakdown of the numerology daily score.
///
/// `life_path` and `destiny` are the score's own variants (component life
/// path, all-letter expression number), not the permanent numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyScore {
    pub score: u8,
    pub life_path: u32,
    pub destiny: u32,
    pub personal_day: u32,
}

/// Score (10–100) of how the permanent numbers align with today's
/// personal day.
pub fn daily_score(identity: &IdentityInput, today: CalendarDate) -> DailyScore {
    let life_path = score_life_path(identity.date_of_birth);
    let destiny = expression_number(&identity.name);
    let personal_day = personal_day_number(identity.date_of_birth, today);

    let mut score = BASE_SCORE;
    score += synergy(life_path, personal_day, [40, 25, 10, -5]);
    score += synergy(destiny, personal_day, [30, 15, 5, 0]);

    if is_master_number(life_path) || is_master_number(destiny) {
        score += 10;
    }
    if matches!(personal_day, 8 | 9) {
        score += 5;
    }

    DailyScore {
        // Clamped to 10..=100.
        score: score.clamp(MIN_SCORE, MAX_SCORE) as u8,
        life_path,
        destiny,
        personal_day,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
