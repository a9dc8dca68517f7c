//! Session controller: the only owner and mutator of the cache slot.
//!
//! Local numbers (permanent numbers, daily draw, scores) are computed on
//! demand from the active identity. Server combinations go through the
//! [`ResultCache`]: a valid entry is reused, otherwise the
//! [`CombinationSource`] is asked for a fresh payload.
//!
//! Two guards keep regeneration well-behaved:
//!
//! - a busy flag allows one in-flight regeneration at a time; a second
//!   request while one is outstanding gets [`SessionError::Busy`];
//! - a generation counter, bumped on every clear/login/logout/resume, lets a
//!   completion that started before the clear be discarded instead of
//!   writing the previous user's numbers into the new session.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::TimeDelta;
use omniluck_core::cache::{
    CacheLookup, CacheState, CachedResult, Clock, ResultCache, SystemClock,
};
use omniluck_core::draw::{daily_draw_for, DailyDraw};
use omniluck_core::identity::IdentityInput;
use omniluck_core::luck::{daily_score, lucky_percentage, DailyScore};
use omniluck_core::numerology::PermanentNumbers;
use omniluck_core::types::CalendarDate;
use omniluck_core::zodiac::ZodiacSign;
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};

use crate::error::{SessionError, SessionResult};
use crate::source::{CombinationSource, LuckRequest, GUEST_UID};
use crate::store::{CacheOwner, FileStore, StoredEntry};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The logged-in user as far as the engine is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub uid: String,
    pub identity: IdentityInput,
}

/// Result of [`SessionController::lottery_numbers`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LotteryOutcome {
    /// A still-valid cached entry was returned; nothing was fetched.
    Cached(CachedResult),
    /// A fresh payload was fetched and stored.
    Fresh(CachedResult),
    /// The fetch completed after the session was cleared; the payload was
    /// dropped and the cache was not touched.
    Discarded,
}

impl LotteryOutcome {
    pub fn result(&self) -> Option<&CachedResult> {
        match self {
            Self::Cached(entry) | Self::Fresh(entry) => Some(entry),
            Self::Discarded => None,
        }
    }
}

/// Everything computed locally for one identity on one day.
#[derive(Debug, Clone, Serialize)]
pub struct LocalReading {
    pub name: String,
    pub date_of_birth: CalendarDate,
    pub date: CalendarDate,
    pub zodiac: ZodiacSign,
    pub permanent: PermanentNumbers,
    pub daily_draw: DailyDraw,
    pub lucky_percentage: u8,
    pub daily_score: DailyScore,
}

/// Clears the busy flag when dropped.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// ---------------------------------------------------------------------------
// SessionController
// ---------------------------------------------------------------------------

/// Owns the active user, the cache slot, and the path to the remote source.
///
/// Safe to share behind an `Arc`; the cache is guarded by an async mutex.
pub struct SessionController<S, C = SystemClock>
where
    S: CombinationSource,
    C: Clock,
{
    source: S,
    cache: Mutex<ResultCache<C>>,
    user: RwLock<Option<SessionUser>>,
    store: Option<FileStore>,
    busy: AtomicBool,
    generation: AtomicU64,
}

impl<S: CombinationSource> SessionController<S, SystemClock> {
    /// Create a controller using wall-clock time.
    pub fn new(source: S) -> Self {
        Self::with_clock(source, SystemClock)
    }
}

impl<S, C> SessionController<S, C>
where
    S: CombinationSource,
    C: Clock,
{
    /// Create a controller with an explicit clock.
    pub fn with_clock(source: S, clock: C) -> Self {
        Self {
            source,
            cache: Mutex::new(ResultCache::new(clock)),
            user: RwLock::new(None),
            store: None,
            busy: AtomicBool::new(false),
            generation: AtomicU64::new(0),
        }
    }

    /// Persist the cache slot to `store`.
    pub fn with_store(mut self, store: FileStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Override the cache TTL.
    pub fn with_ttl(self, ttl: TimeDelta) -> Self {
        let cache = self.cache.into_inner().with_ttl(ttl);
        Self {
            cache: Mutex::new(cache),
            ..self
        }
    }

    // ---- session lifecycle ----

    /// Load the persisted entry, if any, into the cache.
    ///
    /// Entries that are expired, unreadable, or were fetched for a different
    /// uid, name or date of birth are ignored. Returns `true` if an entry was
    /// restored.
    pub async fn restore(&self) -> bool {
        let Some(store) = &self.store else {
            return false;
        };

        let stored = match store.load().await {
            Ok(Some(stored)) => stored,
            Ok(None) => return false,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %store.path().display(),
                    "Ignoring unreadable cache file"
                );
                return false;
            }
        };

        let mut cache = self.cache.lock().await;
        let (uid, identity) = self.active_user().await;
        let owner = CacheOwner::new(uid, &identity);
        if stored.owner != owner {
            tracing::debug!(
                stored_uid = %stored.owner.uid,
                uid = %owner.uid,
                "Persisted lottery numbers belong to another identity"
            );
            return false;
        }

        let generated_at = stored.result.generated_at;
        let restored = cache.restore(stored.result);
        if restored {
            tracing::info!(%generated_at, "Restored cached lottery numbers");
        } else {
            tracing::debug!(%generated_at, "Persisted lottery numbers are stale");
        }
        restored
    }

    /// Make `user` the active user. Any cached result is dropped; a new
    /// login never inherits the previous user's numbers.
    pub async fn login(&self, user: SessionUser) -> SessionResult<()> {
        tracing::info!(uid = %user.uid, "Session login");
        *self.user.write().await = Some(user);
        self.clear_cache().await
    }

    /// Reinstate `user` from an earlier run and reload the persisted entry
    /// if it was fetched for the same uid, name and date of birth.
    ///
    /// Unlike [`SessionController::login`] the file is kept, but the
    /// in-memory slot is reset and any in-flight fetch is discarded.
    pub async fn resume(&self, user: SessionUser) -> bool {
        tracing::debug!(uid = %user.uid, "Session resumed");
        {
            let mut cache = self.cache.lock().await;
            *self.user.write().await = Some(user);
            self.generation.fetch_add(1, Ordering::AcqRel);
            cache.clear();
        }
        self.restore().await
    }

    /// Forget the active user and drop the cached result.
    pub async fn logout(&self) -> SessionResult<()> {
        if let Some(user) = self.user.write().await.take() {
            tracing::info!(uid = %user.uid, "Session logout");
        }
        self.clear_cache().await
    }

    /// Drop the cached result from memory and disk.
    ///
    /// Any regeneration still in flight will be discarded on completion.
    pub async fn clear_cache(&self) -> SessionResult<()> {
        let mut cache = self.cache.lock().await;
        self.generation.fetch_add(1, Ordering::AcqRel);
        let had_entry = cache.clear();
        if let Some(store) = &self.store {
            store.remove().await?;
        }
        tracing::debug!(had_entry, "Cache cleared");
        Ok(())
    }

    // ---- local numbers ----

    /// The active identity, or the guest identity when nobody is logged in.
    pub async fn identity(&self) -> IdentityInput {
        self.active_user().await.1
    }

    pub async fn permanent_numbers(&self) -> PermanentNumbers {
        PermanentNumbers::compute(&self.identity().await)
    }

    pub async fn daily_draw(&self, today: CalendarDate) -> SessionResult<DailyDraw> {
        Ok(daily_draw_for(&self.identity().await, today)?)
    }

    /// All locally computed values for the active identity on `today`.
    pub async fn local_reading(&self, today: CalendarDate) -> SessionResult<LocalReading> {
        let identity = self.identity().await;
        let daily_draw = daily_draw_for(&identity, today)?;
        Ok(LocalReading {
            zodiac: ZodiacSign::from_date(identity.date_of_birth),
            permanent: PermanentNumbers::compute(&identity),
            lucky_percentage: lucky_percentage(&identity, today),
            daily_score: daily_score(&identity, today),
            daily_draw,
            date: today,
            date_of_birth: identity.date_of_birth,
            name: identity.name,
        })
    }

    // ---- server combinations ----

    /// Server lottery numbers, from the cache when valid.
    ///
    /// On a fetch failure the cache is left exactly as it was and the error
    /// is returned so the caller can offer a retry.
    pub async fn lottery_numbers(&self, force_refresh: bool) -> SessionResult<LotteryOutcome> {
        let reason = match self.cache.lock().await.get(force_refresh) {
            CacheLookup::Hit(entry) => {
                tracing::debug!(generated_at = %entry.generated_at, "Lottery cache hit");
                return Ok(LotteryOutcome::Cached(entry));
            }
            CacheLookup::NeedsRegeneration(reason) => reason,
        };

        let Some(_busy) = BusyGuard::acquire(&self.busy) else {
            tracing::debug!("Regeneration already in flight");
            return Err(SessionError::Busy);
        };

        let token = self.generation.load(Ordering::Acquire);
        let (uid, identity) = self.active_user().await;
        let request = LuckRequest::new(uid.clone(), &identity);
        let owner = CacheOwner::new(uid, &identity);
        tracing::info!(?reason, uid = %request.uid, "Fetching lottery numbers");

        let numbers = match self.source.fetch(&request).await {
            Ok(numbers) => numbers,
            Err(e) => {
                tracing::warn!(error = %e, "Lottery fetch failed, cache left untouched");
                return Err(e.into());
            }
        };

        let mut cache = self.cache.lock().await;
        if self.generation.load(Ordering::Acquire) != token {
            tracing::info!("Session changed during fetch, discarding stale lottery numbers");
            return Ok(LotteryOutcome::Discarded);
        }

        let entry = cache.put(numbers).clone();
        if let Some(store) = &self.store {
            let stored = StoredEntry {
                owner,
                result: entry.clone(),
            };
            if let Err(e) = store.save(&stored).await {
                tracing::warn!(
                    error = %e,
                    path = %store.path().display(),
                    "Failed to persist lottery numbers"
                );
            }
        }

        Ok(LotteryOutcome::Fresh(entry))
    }

    /// Coarse state of the cache slot.
    pub async fn cache_state(&self) -> CacheState {
        self.cache.lock().await.state()
    }

    /// Returns `true` while a regeneration is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Uid and identity of the active user, or the guest pair.
    async fn active_user(&self) -> (String, IdentityInput) {
        match self.user.read().await.as_ref() {
            Some(user) => (user.uid.clone(), user.identity.clone()),
            None => (GUEST_UID.to_string(), IdentityInput::guest()),
        }
    }
}
