use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::TimeDelta;
use omniluck_core::cache::DEFAULT_TTL_SECS;

/// Default remote luck service.
pub const DEFAULT_API_URL: &str = "https://omniluck-backend.onrender.com";

/// Longest accepted cache TTL in seconds (one year).
pub const MAX_CACHE_TTL_SECS: i64 = 365 * 24 * 3600;

/// Default HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Session configuration loaded from environment variables.
///
/// All fields have defaults suitable for local use; malformed values are
/// logged and replaced by the default rather than aborting.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Base URL of the remote luck service.
    pub api_url: String,
    /// How long a cached lottery result stays valid.
    pub cache_ttl: TimeDelta,
    /// Where to persist the cached result. `None` keeps it in memory only.
    pub cache_path: Option<PathBuf>,
    /// Per-request timeout for the remote service.
    pub request_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            cache_ttl: TimeDelta::seconds(DEFAULT_TTL_SECS),
            cache_path: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl SessionConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                         | Default                                 |
    /// |---------------------------------|-----------------------------------------|
    /// | `OMNILUCK_API_URL`              | `https://omniluck-backend.onrender.com` |
    /// | `OMNILUCK_CACHE_TTL_SECS`       | `3600`                                  |
    /// | `OMNILUCK_CACHE_PATH`           | unset (no persistence)                  |
    /// | `OMNILUCK_REQUEST_TIMEOUT_SECS` | `30`                                    |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`SessionConfig::from_env`] but reading from an arbitrary
    /// key lookup, so tests need not touch the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_url = lookup("OMNILUCK_API_URL")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let ttl_secs: i64 = parse_or(&lookup, "OMNILUCK_CACHE_TTL_SECS", DEFAULT_TTL_SECS);
        let cache_ttl = match TimeDelta::try_seconds(ttl_secs) {
            Some(ttl) if ttl_secs > 0 && ttl_secs <= MAX_CACHE_TTL_SECS => ttl,
            _ => {
                tracing::warn!(ttl_secs, "Cache TTL out of range, using default");
                TimeDelta::seconds(DEFAULT_TTL_SECS)
            }
        };

        let cache_path = lookup("OMNILUCK_CACHE_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let timeout_secs: u64 = parse_or(
            &lookup,
            "OMNILUCK_REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        );
        let timeout_secs = if timeout_secs > 0 {
            timeout_secs
        } else {
            tracing::warn!("Request timeout must be positive, using default");
            DEFAULT_REQUEST_TIMEOUT_SECS
        };

        Self {
            api_url,
            cache_ttl,
            cache_path,
            request_timeout: Duration::from_secs(timeout_secs),
        }
    }
}

/// Parse `key` from `lookup`, falling back to `default` when unset or malformed.
fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, %default, "Malformed config value, using default");
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = SessionConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.cache_ttl, TimeDelta::hours(1));
        assert!(config.cache_path.is_none());
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn values_are_read() {
        let config = SessionConfig::from_lookup(lookup_from(&[
            ("OMNILUCK_API_URL", "http://localhost:8000"),
            ("OMNILUCK_CACHE_TTL_SECS", "120"),
            ("OMNILUCK_CACHE_PATH", "/tmp/omniluck.json"),
            ("OMNILUCK_REQUEST_TIMEOUT_SECS", "5"),
        ]));
        assert_eq!(config.api_url, "http://localhost:8000");
        assert_eq!(config.cache_ttl, TimeDelta::minutes(2));
        assert_eq!(config.cache_path, Some(PathBuf::from("/tmp/omniluck.json")));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn malformed_values_fall_back() {
        let config = SessionConfig::from_lookup(lookup_from(&[
            ("OMNILUCK_CACHE_TTL_SECS", "an hour"),
            ("OMNILUCK_REQUEST_TIMEOUT_SECS", "-3"),
            ("OMNILUCK_API_URL", "   "),
        ]));
        assert_eq!(config.cache_ttl, TimeDelta::seconds(DEFAULT_TTL_SECS));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn non_positive_ttl_falls_back() {
        let config = SessionConfig::from_lookup(lookup_from(&[("OMNILUCK_CACHE_TTL_SECS", "0")]));
        assert_eq!(config.cache_ttl, TimeDelta::seconds(DEFAULT_TTL_SECS));
    }

    #[test]
    fn oversized_ttl_falls_back() {
        for raw in ["9223372036854775807", "31536001"] {
            let config =
                SessionConfig::from_lookup(lookup_from(&[("OMNILUCK_CACHE_TTL_SECS", raw)]));
            assert_eq!(config.cache_ttl, TimeDelta::seconds(DEFAULT_TTL_SECS));
        }

        let config =
            SessionConfig::from_lookup(lookup_from(&[("OMNILUCK_CACHE_TTL_SECS", "31536000")]));
        assert_eq!(config.cache_ttl, TimeDelta::days(365));
    }

    #[test]
    fn zero_timeout_falls_back() {
        let config =
            SessionConfig::from_lookup(lookup_from(&[("OMNILUCK_REQUEST_TIMEOUT_SECS", "0")]));
        assert_eq!(config.request_timeout, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS));
    }
}
