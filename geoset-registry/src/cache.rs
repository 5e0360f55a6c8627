//! Keyed, timestamped persistence of validated registry payloads.
//!
//! Each key maps to one `<key>.json` file under the cache root holding an
//! envelope with the key, the unix time it was stored and the payload. Only
//! values that already passed validation are ever handed to [`CacheStore::put`],
//! so a hit of any age can be used without checking it again.

use std::io;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use camino::{Utf8Path, Utf8PathBuf};
use geoset_core::CountryCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::CacheError;

const ENTRY_SUFFIX: &str = ".json";

/// Source of the current time for freshness checks.
pub trait Clock {
    /// Seconds since the unix epoch.
    fn now_secs(&self) -> u64;
}

/// [`Clock`] backed by the system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs())
    }
}

/// Name of one cache entry.
///
/// # Examples
/// ```
/// # use geoset_registry::CacheKey;
/// # use geoset_core::CountryCode;
/// assert_eq!(CacheKey::index().as_str(), "registry-index");
/// let code = CountryCode::parse("SA").expect("valid code");
/// assert_eq!(CacheKey::dataset(&code).as_str(), "country-sa");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key of the registry index.
    #[must_use]
    pub fn index() -> Self {
        Self("registry-index".to_owned())
    }

    /// Key of one country dataset.
    #[must_use]
    pub fn dataset(code: &CountryCode) -> Self {
        Self(format!("country-{code}"))
    }

    /// The key as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn file_name(&self) -> String {
        format!("{}{ENTRY_SUFFIX}", self.0)
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Size of the cache on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of stored entries.
    pub entry_count: usize,
    /// Combined size of all entry files in bytes.
    pub total_bytes: u64,
}

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    key: &'a str,
    stored_at: u64,
    payload: &'a T,
}

#[derive(Deserialize)]
struct Envelope<T> {
    key: String,
    stored_at: u64,
    payload: T,
}

/// File-backed cache rooted at an explicit directory.
#[derive(Debug, Clone)]
pub struct CacheStore<C = SystemClock> {
    root: Utf8PathBuf,
    clock: C,
}

impl CacheStore<SystemClock> {
    /// Cache rooted at `root`, using the system clock.
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self::with_clock(root, SystemClock)
    }
}

impl<C: Clock> CacheStore<C> {
    /// Cache rooted at `root` that reads time from `clock`.
    pub fn with_clock(root: impl Into<Utf8PathBuf>, clock: C) -> Self {
        Self {
            root: root.into(),
            clock,
        }
    }

    /// Directory holding the entries.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// The payload stored under `key`, if present and no older than `max_age`.
    #[must_use]
    pub fn get<T: DeserializeOwned>(&self, key: &CacheKey, max_age: Duration) -> Option<T> {
        let envelope = self.read::<T>(key)?;
        let age = self.age_of(envelope.stored_at);
        if age > max_age {
            log::debug!("cache entry {key} is stale ({}s old)", age.as_secs());
            return None;
        }
        Some(envelope.payload)
    }

    /// The payload stored under `key` regardless of its age.
    #[must_use]
    pub fn get_ignoring_age<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        self.read::<T>(key).map(|envelope| envelope.payload)
    }

    /// How long ago `key` was stored.
    #[must_use]
    pub fn age(&self, key: &CacheKey) -> Option<Duration> {
        self.read::<serde::de::IgnoredAny>(key)
            .map(|envelope| self.age_of(envelope.stored_at))
    }

    /// Replace the entry for `key` with `payload`.
    ///
    /// The entry is staged beside its target and renamed into place, so a
    /// concurrent reader sees either the previous entry or the new one.
    pub fn put<T: Serialize>(&self, key: &CacheKey, payload: &T) -> Result<(), CacheError> {
        let envelope = EnvelopeRef {
            key: key.as_str(),
            stored_at: self.clock.now_secs(),
            payload,
        };
        let bytes = serde_json::to_vec(&envelope).map_err(|source| CacheError::Encode {
            key: key.to_string(),
            source,
        })?;
        let path = self.entry_path(key);
        geoset_fs::write_atomic(&path, &bytes)
            .map_err(|source| CacheError::Write { path, source })?;
        log::debug!("cached {key}");
        Ok(())
    }

    /// Remove every entry. A missing cache root is already clear.
    pub fn clear(&self) -> Result<(), CacheError> {
        let names = match geoset_fs::list_file_names(&self.root) {
            Ok(names) => names,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(source) => {
                return Err(CacheError::Clear {
                    path: self.root.clone(),
                    source,
                });
            }
        };
        for name in names.iter().filter(|name| name.ends_with(ENTRY_SUFFIX)) {
            let path = self.root.join(name);
            geoset_fs::remove_file_if_exists(&path)
                .map_err(|source| CacheError::Clear { path, source })?;
        }
        log::info!("cleared cache at {}", self.root);
        Ok(())
    }

    /// Entry count and size, or `None` when the cache root does not exist.
    #[must_use]
    pub fn stats(&self) -> Option<CacheStats> {
        let files = geoset_fs::list_file_sizes(&self.root).ok()?;
        let entries: Vec<u64> = files
            .iter()
            .filter(|(name, _)| name.ends_with(ENTRY_SUFFIX))
            .map(|(_, len)| *len)
            .collect();
        Some(CacheStats {
            entry_count: entries.len(),
            total_bytes: entries.iter().sum(),
        })
    }

    fn entry_path(&self, key: &CacheKey) -> Utf8PathBuf {
        self.root.join(key.file_name())
    }

    fn age_of(&self, stored_at: u64) -> Duration {
        Duration::from_secs(self.clock.now_secs().saturating_sub(stored_at))
    }

    fn read<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<Envelope<T>> {
        let path = self.entry_path(key);
        let bytes = match geoset_fs::read_bytes(&path) {
            Ok(bytes) => bytes,
            Err(err) => {
                if err.kind() != io::ErrorKind::NotFound {
                    log::debug!("cannot read cache entry {path}: {err}");
                }
                return None;
            }
        };
        match serde_json::from_slice::<Envelope<T>>(&bytes) {
            Ok(envelope) if envelope.key == key.as_str() => Some(envelope),
            Ok(envelope) => {
                log::debug!("cache entry {path} belongs to {}", envelope.key);
                None
            }
            Err(err) => {
                log::debug!("discarding undecodable cache entry {path}: {err}");
                None
            }
        }
    }
}
