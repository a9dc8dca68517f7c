//! Deterministic numerology engine and result cache policy for OmniLuck.
//!
//! Everything in this crate is pure: no I/O, no async runtime, no logging.
//! Callers supply the current date (and, for the cache, a [`cache::Clock`])
//! so every result is reproducible in tests.

pub mod cache;
pub mod combination;
pub mod draw;
pub mod error;
pub mod identity;
pub mod luck;
pub mod numerology;
pub mod types;
pub mod zodiac;
