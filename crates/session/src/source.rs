//! The remote combination service boundary.
//!
//! The service is authoritative for lottery combinations; the session only
//! asks it for a fresh payload and caches what comes back.

use std::sync::Arc;

use async_trait::async_trait;
use omniluck_core::combination::LotteryNumbers;
use omniluck_core::identity::IdentityInput;
use serde::Serialize;

/// `uid` sent when no user is logged in.
pub const GUEST_UID: &str = "guest";

/// Default birth time sent when the profile has none.
pub const DEFAULT_BIRTH_TIME: &str = "12:00";

/// Request body for a luck calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LuckRequest {
    pub uid: String,
    pub name: String,
    /// `YYYY-MM-DD`.
    pub dob: String,
    /// `HH:MM`.
    pub birth_time: String,
}

impl LuckRequest {
    pub fn new(uid: impl Into<String>, identity: &IdentityInput) -> Self {
        Self {
            uid: uid.into(),
            name: identity.name.clone(),
            dob: identity.dob_string(),
            birth_time: DEFAULT_BIRTH_TIME.to_string(),
        }
    }
}

/// Errors from the remote combination service.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("Luck API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The response carried no personal combination.
    #[error("Response did not include lottery numbers")]
    MissingNumbers,

    /// The lottery numbers were present but malformed.
    #[error("Invalid lottery payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),

    /// Any other failure (used by non-HTTP sources).
    #[error("{0}")]
    Other(String),
}

/// Something that can produce server-authoritative lottery numbers.
#[async_trait]
pub trait CombinationSource: Send + Sync {
    async fn fetch(&self, request: &LuckRequest) -> Result<LotteryNumbers, SourceError>;
}

#[async_trait]
impl<T: CombinationSource + ?Sized> CombinationSource for Arc<T> {
    async fn fetch(&self, request: &LuckRequest) -> Result<LotteryNumbers, SourceError> {
        (**self).fetch(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn request_uses_iso_dob_and_default_birth_time() {
        let identity = IdentityInput::new("Ada", NaiveDate::from_ymd_opt(1990, 1, 5).unwrap());
        let request = LuckRequest::new(GUEST_UID, &identity);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["uid"], "guest");
        assert_eq!(json["name"], "Ada");
        assert_eq!(json["dob"], "1990-01-05");
        assert_eq!(json["birth_time"], "12:00");
    }
}
