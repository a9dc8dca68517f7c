//! `omniluck-session` library crate.
//!
//! Owns the per-session state around the pure engine in `omniluck-core`:
//! the single cache slot, the active identity, the remote combination
//! source, and optional on-disk persistence of the cached result.

pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod source;
pub mod store;
