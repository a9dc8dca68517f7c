//! Single-slot result cache with a time-to-live.
//!
//! Holds at most one [`CachedResult`] for the active session. The cache does
//! not generate anything; it only decides whether the stored result may be
//! reused or the caller must regenerate.
//!
//! State is either *Valid* (an entry exists and is younger than the TTL) or
//! *Stale/Empty*. `put` always overwrites the whole slot and `clear` empties
//! it. The cache is not synchronized; wrap it in a mutex when shared.

use std::sync::{Arc, Mutex};

use chrono::{TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::combination::LotteryNumbers;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default time-to-live for a cached result (1 hour).
pub const DEFAULT_TTL_SECS: i64 = 3600;

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of "now" for TTL bookkeeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Timestamp>>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// Move the clock forward (or backward, for a negative delta).
    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += delta;
    }

    pub fn set(&self, to: Timestamp) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// ---------------------------------------------------------------------------
// Entry and lookup types
// ---------------------------------------------------------------------------

/// The cached lottery payload plus the moment it was stored.
///
/// Serializes flat as `{ personal_powerball, daily_powerballs, generated_at }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedResult {
    #[serde(flatten)]
    pub numbers: LotteryNumbers,
    pub generated_at: Timestamp,
}

/// Why a lookup did not return the cached entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissReason {
    /// Nothing has been stored (or the slot was cleared).
    Empty,
    /// The entry is at least one TTL old.
    Expired,
    /// The entry claims to be generated after "now".
    FutureTimestamp,
    /// The caller asked to bypass the TTL check.
    ForcedRefresh,
}

/// Outcome of [`ResultCache::get`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    /// The stored entry is still valid.
    Hit(CachedResult),
    /// The caller must regenerate.
    NeedsRegeneration(MissReason),
}

impl CacheLookup {
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }
}

/// Coarse state of the slot, for display and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheState {
    Valid,
    Stale,
    Empty,
}

// ---------------------------------------------------------------------------
// ResultCache
// ---------------------------------------------------------------------------

/// Single-slot TTL cache for the active session's lottery result.
#[derive(Debug)]
pub struct ResultCache<C: Clock = SystemClock> {
    slot: Option<CachedResult>,
    ttl: TimeDelta,
    clock: C,
}

impl Default for ResultCache<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

impl<C: Clock> ResultCache<C> {
    /// Create an empty cache with the default one-hour TTL.
    pub fn new(clock: C) -> Self {
        Self {
            slot: None,
            ttl: TimeDelta::seconds(DEFAULT_TTL_SECS),
            clock,
        }
    }

    /// Override the TTL.
    pub fn with_ttl(mut self, ttl: TimeDelta) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    /// Look up the cached result.
    ///
    /// With `force_refresh` the TTL is bypassed and regeneration is always
    /// requested. Lookups never modify the slot.
    pub fn get(&self, force_refresh: bool) -> CacheLookup {
        if force_refresh {
            return CacheLookup::NeedsRegeneration(MissReason::ForcedRefresh);
        }
        let Some(entry) = &self.slot else {
            return CacheLookup::NeedsRegeneration(MissReason::Empty);
        };
        match self.freshness(entry) {
            None => CacheLookup::Hit(entry.clone()),
            Some(reason) => CacheLookup::NeedsRegeneration(reason),
        }
    }

    /// Overwrite the slot with `numbers`, stamped with the current time.
    pub fn put(&mut self, numbers: LotteryNumbers) -> &CachedResult {
        let entry = CachedResult {
            numbers,
            generated_at: self.clock.now(),
        };
        self.slot.insert(entry)
    }

    /// Load a previously persisted entry, keeping its original timestamp.
    ///
    /// Returns `false` (and leaves the slot unchanged) if the entry is
    /// already stale.
    pub fn restore(&mut self, entry: CachedResult) -> bool {
        if self.freshness(&entry).is_some() {
            return false;
        }
        self.slot = Some(entry);
        true
    }

    /// Empty the slot. Returns `true` if something was removed.
    pub fn clear(&mut self) -> bool {
        self.slot.take().is_some()
    }

    /// The stored entry regardless of age.
    pub fn peek(&self) -> Option<&CachedResult> {
        self.slot.as_ref()
    }

    pub fn state(&self) -> CacheState {
        match &self.slot {
            None => CacheState::Empty,
            Some(entry) if self.freshness(entry).is_none() => CacheState::Valid,
            Some(_) => CacheState::Stale,
        }
    }

    /// Time left before the stored entry expires, if it is still valid.
    pub fn remaining(&self) -> Option<TimeDelta> {
        let entry = self.slot.as_ref()?;
        if self.freshness(entry).is_some() {
            return None;
        }
        // elapsed is in [0, ttl) here, so this cannot overflow.
        Some(self.ttl - (self.clock.now() - entry.generated_at))
    }

    /// `None` when `entry` is valid, otherwise the reason it is not.
    fn freshness(&self, entry: &CachedResult) -> Option<MissReason> {
        let elapsed = self.clock.now() - entry.generated_at;
        if elapsed < TimeDelta::zero() {
            Some(MissReason::FutureTimestamp)
        } else if elapsed >= self.ttl {
            Some(MissReason::Expired)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combination::Combination;
    use chrono::TimeZone;

    fn start() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap()
    }

    fn numbers(powerball: u8) -> LotteryNumbers {
        LotteryNumbers::new(
            Combination::new(&[1, 2, 3, 4, 5], powerball).unwrap(),
            vec![Combination::new(&[10, 20, 30, 40, 50], 9).unwrap()],
        )
    }

    fn cache() -> (ResultCache<ManualClock>, ManualClock) {
        let clock = ManualClock::new(start());
        (ResultCache::new(clock.clone()), clock)
    }

    // -- empty slot --

    #[test]
    fn empty_cache_needs_regeneration() {
        let (cache, _) = cache();
        assert_eq!(
            cache.get(false),
            CacheLookup::NeedsRegeneration(MissReason::Empty)
        );
        assert_eq!(cache.state(), CacheState::Empty);
        assert!(cache.remaining().is_none());
    }

    // -- put / get --

    #[test]
    fn get_after_put_returns_entry_unchanged() {
        let (mut cache, clock) = cache();
        let stored = cache.put(numbers(6)).clone();
        assert_eq!(stored.generated_at, start());

        clock.advance(TimeDelta::minutes(59));
        assert_eq!(cache.get(false), CacheLookup::Hit(stored));
        assert_eq!(cache.state(), CacheState::Valid);
    }

    #[test]
    fn entry_expires_at_exactly_one_hour() {
        let (mut cache, clock) = cache();
        cache.put(numbers(6));

        clock.advance(TimeDelta::seconds(DEFAULT_TTL_SECS - 1));
        assert!(cache.get(false).is_hit());

        clock.advance(TimeDelta::seconds(1));
        assert_eq!(
            cache.get(false),
            CacheLookup::NeedsRegeneration(MissReason::Expired)
        );
        assert_eq!(cache.state(), CacheState::Stale);
    }

    #[test]
    fn fresh_entry_half_an_hour_old() {
        let (mut cache, clock) = cache();
        let stored = cache.put(numbers(6)).clone();
        clock.advance(TimeDelta::minutes(30));

        assert_eq!(cache.get(false), CacheLookup::Hit(stored));
        assert_eq!(
            cache.get(true),
            CacheLookup::NeedsRegeneration(MissReason::ForcedRefresh)
        );
        // Forcing does not evict the entry.
        assert!(cache.get(false).is_hit());
    }

    #[test]
    fn force_refresh_always_misses() {
        let (mut cache, _) = cache();
        assert_eq!(
            cache.get(true),
            CacheLookup::NeedsRegeneration(MissReason::ForcedRefresh)
        );
        cache.put(numbers(6));
        assert!(!cache.get(true).is_hit());
    }

    #[test]
    fn put_overwrites_wholesale_and_restamps() {
        let (mut cache, clock) = cache();
        cache.put(numbers(6));
        clock.advance(TimeDelta::minutes(50));
        cache.put(numbers(7));

        let entry = cache.peek().unwrap();
        assert_eq!(entry.numbers.personal_powerball.powerball(), 7);
        assert_eq!(entry.generated_at, start() + TimeDelta::minutes(50));

        clock.advance(TimeDelta::minutes(50));
        assert!(cache.get(false).is_hit());
    }

    #[test]
    fn remaining_counts_down() {
        let (mut cache, clock) = cache();
        cache.put(numbers(6));
        clock.advance(TimeDelta::minutes(45));
        assert_eq!(cache.remaining(), Some(TimeDelta::minutes(15)));
    }

    #[test]
    fn remaining_with_huge_ttl() {
        let clock = ManualClock::new(start());
        let mut cache = ResultCache::new(clock.clone()).with_ttl(TimeDelta::MAX);
        cache.put(numbers(6));
        clock.advance(TimeDelta::minutes(1));
        assert_eq!(cache.remaining(), Some(TimeDelta::MAX - TimeDelta::minutes(1)));
        assert!(cache.get(false).is_hit());
    }

    #[test]
    fn custom_ttl_is_honoured() {
        let clock = ManualClock::new(start());
        let mut cache = ResultCache::new(clock.clone()).with_ttl(TimeDelta::minutes(5));
        cache.put(numbers(6));
        clock.advance(TimeDelta::minutes(5));
        assert!(!cache.get(false).is_hit());
    }

    // -- clock skew --

    #[test]
    fn entry_from_the_future_is_stale() {
        let (mut cache, clock) = cache();
        cache.put(numbers(6));
        clock.advance(TimeDelta::minutes(-1));
        assert_eq!(
            cache.get(false),
            CacheLookup::NeedsRegeneration(MissReason::FutureTimestamp)
        );
    }

    // -- clear --

    #[test]
    fn clear_empties_the_slot() {
        let (mut cache, _) = cache();
        cache.put(numbers(6));
        assert!(cache.clear());
        assert!(!cache.clear());
        assert_eq!(cache.state(), CacheState::Empty);
        assert_eq!(
            cache.get(false),
            CacheLookup::NeedsRegeneration(MissReason::Empty)
        );
    }

    // -- restore --

    #[test]
    fn restore_keeps_original_timestamp() {
        let (mut cache, clock) = cache();
        let entry = CachedResult {
            numbers: numbers(6),
            generated_at: start() - TimeDelta::minutes(20),
        };
        assert!(cache.restore(entry.clone()));
        assert_eq!(cache.get(false), CacheLookup::Hit(entry));

        clock.advance(TimeDelta::minutes(40));
        assert!(!cache.get(false).is_hit());
    }

    #[test]
    fn restore_rejects_expired_entry() {
        let (mut cache, _) = cache();
        let entry = CachedResult {
            numbers: numbers(6),
            generated_at: start() - TimeDelta::hours(2),
        };
        assert!(!cache.restore(entry));
        assert_eq!(cache.state(), CacheState::Empty);
    }

    // -- persisted layout --

    #[test]
    fn cached_result_serializes_flat() {
        let entry = CachedResult {
            numbers: numbers(6),
            generated_at: start(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["personal_powerball"]["powerball"], 6);
        assert_eq!(json["daily_powerballs"].as_array().unwrap().len(), 1);
        assert_eq!(json["generated_at"], "2024-03-15T09:00:00Z");

        let back: CachedResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }
}
