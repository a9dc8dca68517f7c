use omniluck_core::error::CoreError;

use crate::source::SourceError;
use crate::store::StoreError;

/// Errors surfaced by the session controller.
///
/// Only [`SessionError::Source`] represents a remote failure the user can
/// retry; the cache is left untouched in every error case.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A domain-level error from `omniluck_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The remote combination service failed.
    #[error("Combination service failed: {0}")]
    Source(#[from] SourceError),

    /// Reading or writing the persisted cache failed.
    #[error("Cache store failed: {0}")]
    Store(#[from] StoreError),

    /// A regeneration is already in flight.
    #[error("A regeneration is already in progress")]
    Busy,
}

/// Convenience type alias for controller return values.
pub type SessionResult<T> = Result<T, SessionError>;
