use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "omniluck")]
#[command(version, about = "Deterministic numerology and lucky numbers")]
pub struct Cli {
    /// Full name used for the name-based numbers
    #[arg(long, env = "OMNILUCK_NAME", default_value = "")]
    pub name: String,

    /// Date of birth, YYYY-MM-DD
    #[arg(long, env = "OMNILUCK_DOB", default_value = "")]
    pub dob: String,

    /// Reading date, YYYY-MM-DD (defaults to today, local time)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Account id sent to the luck service; omit to run as guest
    #[arg(long, env = "OMNILUCK_UID")]
    pub uid: Option<String>,

    /// Also fetch server lottery combinations (cached for the TTL)
    #[arg(long)]
    pub fetch: bool,

    /// Ignore a valid cached result and fetch again (implies --fetch)
    #[arg(long)]
    pub force_refresh: bool,

    /// Drop the cached result before doing anything else
    #[arg(long)]
    pub clear_cache: bool,

    /// Override the cache file location
    #[arg(long)]
    pub cache_path: Option<PathBuf>,
}

impl Cli {
    pub fn wants_lottery(&self) -> bool {
        self.fetch || self.force_refresh
    }
}
