//! File-backed document cache, one file per cache key.
//!
//! Entries expire when the server says so: the stored document's own
//! `nextupdate` (named locations) or `nextrun` (coordinate API) metadata
//! decides freshness, not the time it was written.

use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde_json::Value;
use std::io::Write;
use std::path::PathBuf;
use yr_core::CacheConfig;

use crate::error::{ForecastError, Result};
use crate::target::ForecastKind;
use crate::xml;

const LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Outcome of a freshness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Stale,
    /// Expiry could not be determined; callers treat this as stale.
    Unknown,
}

impl Freshness {
    pub fn is_fresh(self) -> bool {
        self == Freshness::Fresh
    }
}

#[derive(Debug, Clone)]
pub struct ForecastCache {
    directory: PathBuf,
    extension: String,
}

impl ForecastCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            directory: config.directory.clone(),
            extension: config.extension.clone(),
        }
    }

    /// File backing a cache key.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{}.{}", key, self.extension))
    }

    pub fn exists(&self, key: &str) -> bool {
        self.path_for(key).is_file()
    }

    pub fn load(&self, key: &str) -> Result<String> {
        let path = self.path_for(key);
        tracing::info!("read from cachefile: {}", path.display());
        std::fs::read_to_string(&path).map_err(|source| ForecastError::CacheIo {
            key: key.to_string(),
            source,
        })
    }

    /// Store a document, replacing any previous entry as a whole.
    ///
    /// The document is written to a temporary file in the cache directory and
    /// renamed into place, so readers see either the old or the new file.
    pub fn store(&self, key: &str, document: &str) -> Result<()> {
        let path = self.path_for(key);
        tracing::info!("writing cachefile: {}", path.display());

        let io_err = |source: std::io::Error| ForecastError::CacheIo {
            key: key.to_string(),
            source,
        };

        std::fs::create_dir_all(&self.directory).map_err(io_err)?;
        let mut file = tempfile::NamedTempFile::new_in(&self.directory).map_err(io_err)?;
        file.write_all(document.as_bytes()).map_err(io_err)?;
        file.persist(&path).map_err(|e| io_err(e.error))?;
        Ok(())
    }

    /// Remove an entry. Missing entries are not an error.
    pub fn purge(&self, key: &str) {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => tracing::info!("removed cachefile: {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("could not remove cachefile {}: {}", path.display(), e),
        }
    }

    /// Expiry instant declared by the cached document, in local time.
    pub fn valid_until(&self, key: &str, kind: ForecastKind) -> Result<NaiveDateTime> {
        let raw = self
            .load(key)
            .map_err(|e| ForecastError::CacheRead(e.to_string()))?;
        let tree = xml::parse(&raw).map_err(|e| ForecastError::CacheRead(e.to_string()))?;
        let meta = &tree["weatherdata"]["meta"];

        let valid_until = match kind {
            ForecastKind::Named => {
                let next_update = meta["nextupdate"].as_str().ok_or_else(|| {
                    ForecastError::CacheRead("meta/nextupdate missing".to_string())
                })?;
                NaiveDateTime::parse_from_str(next_update, LOCAL_FORMAT)
                    .map_err(|e| ForecastError::CacheRead(format!("nextupdate: {}", e)))?
            }
            ForecastKind::Api => {
                let next_run = match &meta["model"] {
                    Value::Array(models) => models.first().and_then(|m| m["@nextrun"].as_str()),
                    model => model["@nextrun"].as_str(),
                }
                .ok_or_else(|| {
                    ForecastError::CacheRead("meta/model@nextrun missing".to_string())
                })?;
                let utc = next_run
                    .parse::<DateTime<Utc>>()
                    .map_err(|e| ForecastError::CacheRead(format!("nextrun: {}", e)))?;
                utc.with_timezone(&Local).naive_local()
            }
        };

        tracing::info!("Cache is valid until {}", valid_until);
        Ok(valid_until)
    }

    /// Freshness relative to the current local time.
    pub fn freshness(&self, key: &str, kind: ForecastKind) -> Freshness {
        let now = Local::now().naive_local();
        tracing::info!("Now is {}", now);
        self.freshness_at(key, kind, now)
    }

    /// Freshness relative to `now`. Unreadable metadata yields `Unknown`.
    pub fn freshness_at(&self, key: &str, kind: ForecastKind, now: NaiveDateTime) -> Freshness {
        match self.valid_until(key, kind) {
            Ok(valid_until) if now <= valid_until => Freshness::Fresh,
            Ok(_) => Freshness::Stale,
            Err(e) => {
                tracing::warn!("treating cache entry {} as stale: {}", key, e);
                Freshness::Unknown
            }
        }
    }

    pub fn is_fresh(&self, key: &str, kind: ForecastKind) -> bool {
        self.freshness(key, kind).is_fresh()
    }
}
