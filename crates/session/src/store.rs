//! On-disk persistence of the single cache slot.
//!
//! The file holds one JSON object: the owner of the entry plus the cached
//! payload,
//! `{ "owner": { "uid", "name", "date_of_birth" }, "personal_powerball": …,
//! "daily_powerballs": […], "generated_at": "<RFC 3339>" }`.
//! Saves write a sibling temp file and rename it over the target so a
//! reader never observes a half-written entry.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use omniluck_core::cache::CachedResult;
use omniluck_core::identity::IdentityInput;
use omniluck_core::types::CalendarDate;
use serde::{Deserialize, Serialize};

/// Errors from reading or writing the persisted cache.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed cache file: {0}")]
    Json(#[from] serde_json::Error),
}

/// The account and identity a persisted entry was fetched for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheOwner {
    pub uid: String,
    pub name: String,
    pub date_of_birth: CalendarDate,
}

impl CacheOwner {
    pub fn new(uid: impl Into<String>, identity: &IdentityInput) -> Self {
        Self {
            uid: uid.into(),
            name: identity.name.clone(),
            date_of_birth: identity.date_of_birth,
        }
    }
}

/// A cached result tagged with its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEntry {
    pub owner: CacheOwner,
    #[serde(flatten)]
    pub result: CachedResult,
}

/// JSON file holding the persisted [`StoredEntry`].
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted entry. A missing file is `Ok(None)`.
    pub async fn load(&self) -> Result<Option<StoredEntry>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Replace the persisted entry.
    pub async fn save(&self, entry: &StoredEntry) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let json = serde_json::to_vec_pretty(entry)?;
        let tmp = self.temp_path();
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Delete the persisted entry. Returns `false` if there was none.
    pub async fn remove(&self) -> Result<bool, StoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
