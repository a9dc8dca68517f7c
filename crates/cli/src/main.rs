//! `omniluck` -- numerology and lucky numbers from the command line.
//!
//! Prints the permanent numbers, daily draw, zodiac sign and daily luck
//! score for a name and birth date as JSON on stdout. With `--fetch` it also
//! asks the luck service for lottery combinations, reusing a cached result
//! for up to the configured TTL.
//!
//! # Environment variables
//!
//! | Variable                        | Default                                 |
//! |---------------------------------|-----------------------------------------|
//! | `OMNILUCK_NAME`                 | --                                      |
//! | `OMNILUCK_DOB`                  | --                                      |
//! | `OMNILUCK_UID`                  | `guest`                                 |
//! | `OMNILUCK_API_URL`              | `https://omniluck-backend.onrender.com` |
//! | `OMNILUCK_CACHE_TTL_SECS`       | `3600`                                  |
//! | `OMNILUCK_CACHE_PATH`           | unset (no persistence)                  |
//! | `OMNILUCK_REQUEST_TIMEOUT_SECS` | `30`                                    |

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use omniluck_core::cache::CachedResult;
use omniluck_core::identity::IdentityInput;
use omniluck_session::client::LuckApiClient;
use omniluck_session::config::SessionConfig;
use omniluck_session::controller::{LocalReading, LotteryOutcome, SessionController, SessionUser};
use omniluck_session::source::GUEST_UID;
use omniluck_session::store::FileStore;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

use cli::Cli;

#[derive(Debug, Serialize)]
struct Report {
    #[serde(flatten)]
    reading: LocalReading,
    #[serde(skip_serializing_if = "Option::is_none")]
    lottery: Option<LotteryReport>,
}

#[derive(Debug, Serialize)]
struct LotteryReport {
    /// `"cached"` or `"fresh"`.
    source: &'static str,
    #[serde(flatten)]
    entry: CachedResult,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "omniluck=info,omniluck_session=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let normalized = IdentityInput::from_raw(&cli.name, &cli.dob);
    if normalized.name_defaulted {
        tracing::warn!(name = %normalized.identity.name, "No usable name given, using default");
    }
    if normalized.dob_defaulted {
        tracing::warn!(
            dob = %normalized.identity.dob_string(),
            raw = %cli.dob,
            "No usable date of birth given, using default"
        );
    }

    let mut config = SessionConfig::from_env();
    if let Some(path) = cli.cache_path.clone() {
        config.cache_path = Some(path);
    }

    let today = cli
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let uid = cli.uid.clone().unwrap_or_else(|| GUEST_UID.to_string());

    let client = LuckApiClient::new(&config.api_url, config.request_timeout)
        .context("Failed to build HTTP client")?;
    let mut session = SessionController::new(client).with_ttl(config.cache_ttl);
    if let Some(path) = &config.cache_path {
        session = session.with_store(FileStore::new(scoped_cache_path(path, &uid)));
    }

    session
        .resume(SessionUser {
            uid,
            identity: normalized.identity,
        })
        .await;

    if cli.clear_cache {
        session.clear_cache().await.context("Failed to clear cache")?;
    }

    let reading = session
        .local_reading(today)
        .await
        .context("Failed to compute local numbers")?;

    let lottery = if cli.wants_lottery() {
        let outcome = session
            .lottery_numbers(cli.force_refresh)
            .await
            .context("Failed to get lottery numbers")?;
        match outcome {
            LotteryOutcome::Cached(entry) => Some(LotteryReport {
                source: "cached",
                entry,
            }),
            LotteryOutcome::Fresh(entry) => Some(LotteryReport {
                source: "fresh",
                entry,
            }),
            LotteryOutcome::Discarded => None,
        }
    } else {
        None
    };

    let report = Report { reading, lottery };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// One cache file per account: `cache.json` becomes `cache-<uid>.json`.
fn scoped_cache_path(path: &Path, uid: &str) -> PathBuf {
    let uid: String = uid
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "omniluck-cache".to_string());
    let name = match path.extension() {
        Some(ext) => format!("{stem}-{uid}.{}", ext.to_string_lossy()),
        None => format!("{stem}-{uid}"),
    };
    path.with_file_name(name)
}
