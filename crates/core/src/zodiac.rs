//! Western (tropical) zodiac sign lookup by birth date.

use chrono::Datelike;
use serde::Serialize;

use crate::types::CalendarDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ZodiacSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl ZodiacSign {
    /// Sign for a calendar date. Each entry is (month, first day of the
    /// later sign, sign before the cusp, sign from the cusp on).
    pub fn from_date(date: CalendarDate) -> Self {
        use ZodiacSign::*;

        const CUSPS: [(u32, u32, ZodiacSign, ZodiacSign); 12] = [
            (1, 20, Capricorn, Aquarius),
            (2, 19, Aquarius, Pisces),
            (3, 21, Pisces, Aries),
            (4, 20, Aries, Taurus),
            (5, 21, Taurus, Gemini),
            (6, 22, Gemini, Cancer),
            (7, 23, Cancer, Leo),
            (8, 23, Leo, Virgo),
            (9, 23, Virgo, Libra),
            (10, 24, Libra, Scorpio),
            (11, 23, Scorpio, Sagittarius),
            (12, 22, Sagittarius, Capricorn),
        ];

        // month() is always 1..=12.
        let (_, cusp, before, after) = CUSPS[date.month0() as usize];
        if date.day() >= cusp {
            after
        } else {
            before
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Aries => "Aries",
            Self::Taurus => "Taurus",
            Self::Gemini => "Gemini",
            Self::Cancer => "Cancer",
            Self::Leo => "Leo",
            Self::Virgo => "Virgo",
            Self::Libra => "Libra",
            Self::Scorpio => "Scorpio",
            Self::Sagittarius => "Sagittarius",
            Self::Capricorn => "Capricorn",
            Self::Aquarius => "Aquarius",
            Self::Pisces => "Pisces",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Aries => "♈",
            Self::Taurus => "♉",
            Self::Gemini => "♊",
            Self::Cancer => "♋",
            Self::Leo => "♌",
            Self::Virgo => "♍",
            Self::Libra => "♎",
            Self::Scorpio => "♏",
            Self::Sagittarius => "♐",
            Self::Capricorn => "♑",
            Self::Aquarius => "♒",
            Self::Pisces => "♓",
        }
    }
}
