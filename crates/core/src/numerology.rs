//! Permanent numerology numbers: life path, soul, destiny, and master.
//!
//! Letters use the Pythagorean mod-9 table (`a=1 .. i=9, j=1 .. r=9, s=1 ..`).
//! Only ASCII letters have an alphabet position; other characters (digits,
//! punctuation, accented letters) contribute nothing.
//!
//! All functions are pure and depend only on the date of birth and name,
//! never on the current day.

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::identity::IdentityInput;
use crate::types::CalendarDate;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Values that survive reduction when master numbers are kept.
pub const MASTER_NUMBERS: [u32; 3] = [11, 22, 33];

/// Fallback for soul and destiny numbers when the name has no qualifying letters.
pub const EMPTY_NAME_FALLBACK: u32 = 1;

// ---------------------------------------------------------------------------
// Reduction
// ---------------------------------------------------------------------------

/// Returns `true` for 11, 22 and 33.
pub fn is_master_number(n: u32) -> bool {
    MASTER_NUMBERS.contains(&n)
}

/// Sum the decimal digits of `n` once.
fn digit_sum(mut n: u32) -> u32 {
    let mut sum = 0;
    while n > 0 {
        sum += n % 10;
        n /= 10;
    }
    sum
}

/// Repeatedly sum decimal digits until the value is at most 9.
///
/// With `keep_master`, reduction stops as soon as an intermediate value is a
/// master number (11, 22, 33). Zero reduces to zero; callers that need a
/// non-zero result apply their own fallback.
pub fn reduce_to_single_digit(n: u32, keep_master: bool) -> u32 {
    let mut n = n;
    while n > 9 {
        if keep_master && is_master_number(n) {
            return n;
        }
        n = digit_sum(n);
    }
    n
}

// ---------------------------------------------------------------------------
// Letter values
// ---------------------------------------------------------------------------

/// Vowel values used for the soul number.
fn vowel_value(c: char) -> Option<u32> {
    match c.to_ascii_lowercase() {
        'a' => Some(1),
        'e' => Some(5),
        'i' => Some(9),
        'o' => Some(6),
        'u' => Some(3),
        _ => None,
    }
}

/// Mod-9 value of an ASCII letter: `((position - 1) mod 9) + 1`, never 0.
pub fn letter_value(c: char) -> Option<u32> {
    if !c.is_ascii_alphabetic() {
        return None;
    }
    let position = u32::from(c.to_ascii_lowercase() as u8 - b'a') + 1;
    Some((position - 1) % 9 + 1)
}

fn is_vowel(c: char) -> bool {
    vowel_value(c).is_some()
}

// ---------------------------------------------------------------------------
// Permanent numbers
// ---------------------------------------------------------------------------

/// Life path: sum every digit of `YYYYMMDD`, then reduce keeping master numbers.
pub fn life_path_number(dob: CalendarDate) -> u32 {
    let sum =
        digit_sum(dob.year().unsigned_abs()) + digit_sum(dob.month()) + digit_sum(dob.day());
    reduce_to_single_digit(sum, true)
}

/// Soul: sum of vowel values in the name, reduced without master numbers.
pub fn soul_number(name: &str) -> u32 {
    let sum: u32 = name.chars().filter_map(vowel_value).sum();
    non_zero(reduce_to_single_digit(sum, false))
}

/// Destiny: sum of mod-9 values of the consonants in the name, reduced
/// without master numbers.
pub fn destiny_number(name: &str) -> u32 {
    let sum: u32 = name
        .chars()
        .filter(|c| !is_vowel(*c))
        .filter_map(letter_value)
        .sum();
    non_zero(reduce_to_single_digit(sum, false))
}

/// Sum of mod-9 values of every letter in the name (vowels included).
pub fn name_letter_sum(name: &str) -> u32 {
    name.chars().filter_map(letter_value).sum()
}

/// Master: life path plus the reduced full-name letter sum, reduced keeping
/// master numbers.
pub fn master_number(dob: CalendarDate, name: &str) -> u32 {
    let name_value = reduce_to_single_digit(name_letter_sum(name), false);
    reduce_to_single_digit(life_path_number(dob) + name_value, true)
}

fn non_zero(value: u32) -> u32 {
    if value == 0 {
        EMPTY_NAME_FALLBACK
    } else {
        value
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// The four numbers that never change for a given identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermanentNumbers {
    pub life_path: u32,
    pub soul: u32,
    pub destiny: u32,
    pub master: u32,
}

impl PermanentNumbers {
    /// Compute all four permanent numbers for an identity.
    pub fn compute(identity: &IdentityInput) -> Self {
        Self {
            life_path: life_path_number(identity.date_of_birth),
            soul: soul_number(&identity.name),
            destiny: destiny_number(&identity.name),
            master: master_number(identity.date_of_birth, &identity.name),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
