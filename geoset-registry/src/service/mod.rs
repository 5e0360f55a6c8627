//! Fetch, validate, cache and fall back: the registry resolution policy.
//!
//! Both entry points share one sequence, parameterised by cache key and
//! freshness window:
//!
//! 1. A local source is fetched and validated directly, bypassing the cache.
//! 2. A fresh cache hit is used as is.
//! 3. Otherwise the payload is fetched. If that fails, a cached copy of any
//!    age is used with a single [`RegistryWarning::StaleCache`]; with no copy
//!    the fetch error is returned.
//! 4. A fetched payload is validated. A failure yields
//!    [`Resolution::Invalid`] with a warning and leaves the cache untouched.
//! 5. A valid payload is cached, then used.
//!
//! Only validated values reach the cache, so hits are never re-validated.

use std::fmt;
use std::time::Duration;

use geoset_core::{
    Config, CountryCode, CountryDataset, INDEX_FILE_NAME, Payload, RegistryIndex, Schema,
    ValidationError, project,
};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::{
    CacheError, CacheKey, CacheStats, CacheStore, Clock, FetchError, RegistryError, RegistrySource,
    SystemClock,
};

/// How long a cached index is served without re-fetching.
pub const INDEX_FRESHNESS: Duration = Duration::from_secs(60 * 60);

/// How long a cached dataset is served without re-fetching.
pub const DATASET_FRESHNESS: Duration = Duration::from_secs(24 * 60 * 60);

/// Result of a resolution that reached a payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T> {
    /// The payload passed validation (or came from the cache).
    Valid(T),
    /// The source answered with a payload that failed validation.
    Invalid(ValidationError),
}

impl<T> Resolution<T> {
    /// The valid value, if any.
    pub fn valid(self) -> Option<T> {
        match self {
            Self::Valid(value) => Some(value),
            Self::Invalid(_) => None,
        }
    }

    /// Transform the valid value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resolution<U> {
        match self {
            Self::Valid(value) => Resolution::Valid(f(value)),
            Self::Invalid(error) => Resolution::Invalid(error),
        }
    }
}

/// Recoverable conditions handled inside the registry layer.
#[derive(Debug)]
#[non_exhaustive]
pub enum RegistryWarning {
    /// The source was unreachable and a cached copy older than its window was used.
    StaleCache {
        /// Entry that was served.
        key: CacheKey,
        /// Age of the entry, when known.
        age: Option<Duration>,
    },
    /// The source answered with a payload that failed validation.
    InvalidPayload {
        /// Entry the payload was fetched for.
        key: CacheKey,
        /// First violated constraint.
        error: ValidationError,
    },
    /// A validated payload could not be cached; it was still used.
    CacheWrite {
        /// Entry being written.
        key: CacheKey,
        /// Underlying failure.
        error: CacheError,
    },
}

impl fmt::Display for RegistryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaleCache { key, age: Some(age) } => write!(
                f,
                "registry unreachable; using cached {key} from {} minutes ago",
                age.as_secs() / 60
            ),
            Self::StaleCache { key, age: None } => {
                write!(f, "registry unreachable; using cached {key}")
            }
            Self::InvalidPayload { key, error } => {
                write!(f, "registry returned an invalid payload for {key}: {error}")
            }
            Self::CacheWrite { key, error } => write!(f, "could not cache {key}: {error}"),
        }
    }
}

/// Destination for [`RegistryWarning`]s.
pub trait WarningSink {
    /// Report one warning.
    fn warn(&self, warning: RegistryWarning);
}

/// [`WarningSink`] forwarding to `log::warn!`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogWarnings;

impl WarningSink for LogWarnings {
    fn warn(&self, warning: RegistryWarning) {
        log::warn!("{warning}");
    }
}

/// Resolves the registry index and country datasets from a source and cache.
///
/// # Examples
/// ```no_run
/// use geoset_core::{Config, CountryCode};
/// use geoset_registry::{CacheStore, RegistryEndpoint, RegistryLocation, RegistryService};
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let source = RegistryEndpoint::from_location(RegistryLocation::from_env()?)?;
/// let service = RegistryService::new(source, CacheStore::new("/tmp/geoset-cache"));
/// let config = Config::new("src/data", ["en", "ar"], false, true)?;
/// let code = CountryCode::parse("sa")?;
/// if let Some(dataset) = service.resolve_dataset(&code, &config).await?.valid() {
///     println!("{} regions", dataset.regions.len());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct RegistryService<S, C = SystemClock, W = LogWarnings> {
    source: S,
    cache: CacheStore<C>,
    warnings: W,
}

impl<S: RegistrySource, C: Clock> RegistryService<S, C, LogWarnings> {
    /// Service over `source` and `cache`, logging warnings.
    pub fn new(source: S, cache: CacheStore<C>) -> Self {
        Self {
            source,
            cache,
            warnings: LogWarnings,
        }
    }
}

impl<S: RegistrySource, C: Clock, W: WarningSink> RegistryService<S, C, W> {
    /// Replace the warning sink.
    pub fn with_warnings<V: WarningSink>(self, warnings: V) -> RegistryService<S, C, V> {
        RegistryService {
            source: self.source,
            cache: self.cache,
            warnings,
        }
    }

    /// The underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The underlying cache.
    pub fn cache(&self) -> &CacheStore<C> {
        &self.cache
    }

    /// The warning sink.
    pub fn warnings(&self) -> &W {
        &self.warnings
    }

    /// Resolve the registry index.
    pub async fn resolve_index(&self) -> Result<Resolution<RegistryIndex>, RegistryError> {
        self.resolve(CacheKey::index(), INDEX_FILE_NAME, INDEX_FRESHNESS).await
    }

    /// Resolve one dataset and project it for `config`.
    pub async fn resolve_dataset(
        &self,
        code: &CountryCode,
        config: &Config,
    ) -> Result<Resolution<CountryDataset>, RegistryError> {
        let resolution: Resolution<CountryDataset> = self
            .resolve(CacheKey::dataset(code), &code.file_name(), DATASET_FRESHNESS)
            .await?;
        Ok(resolution.map(|dataset| project(&dataset, config)))
    }

    /// Remove every cached entry.
    pub fn clear_cache(&self) -> Result<(), CacheError> {
        self.cache.clear()
    }

    /// Size of the cache, or `None` when nothing was ever cached.
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.stats()
    }

    async fn resolve<T>(
        &self,
        key: CacheKey,
        path: &str,
        window: Duration,
    ) -> Result<Resolution<T>, RegistryError>
    where
        T: Schema + Serialize + DeserializeOwned,
    {
        if !self.source.is_remote() {
            let bytes = self.source.fetch(path).await?;
            return Ok(self.validate(&key, bytes));
        }

        if let Some(cached) = self.cache.get::<T>(&key, window) {
            log::debug!("using fresh cache entry {key}");
            return Ok(Resolution::Valid(cached));
        }

        let bytes = match self.source.fetch(path).await {
            Ok(bytes) => bytes,
            Err(err) => return self.fall_back(key, err),
        };

        let resolution = self.validate::<T>(&key, bytes);
        if let Resolution::Valid(value) = &resolution {
            if let Err(error) = self.cache.put(&key, value) {
                self.warnings.warn(RegistryWarning::CacheWrite { key, error });
            }
        }
        Ok(resolution)
    }

    fn validate<T: Schema>(&self, key: &CacheKey, bytes: Vec<u8>) -> Resolution<T> {
        match Payload::parse(bytes).and_then(|payload| T::validate(&payload)) {
            Ok(value) => Resolution::Valid(value),
            Err(error) => {
                self.warnings.warn(RegistryWarning::InvalidPayload {
                    key: key.clone(),
                    error: error.clone(),
                });
                Resolution::Invalid(error)
            }
        }
    }

    fn fall_back<T: DeserializeOwned>(
        &self,
        key: CacheKey,
        err: FetchError,
    ) -> Result<Resolution<T>, RegistryError> {
        log::debug!("fetch for {key} failed: {err}");
        match self.cache.get_ignoring_age::<T>(&key) {
            Some(stale) => {
                let age = self.cache.age(&key);
                self.warnings.warn(RegistryWarning::StaleCache { key, age });
                Ok(Resolution::Valid(stale))
            }
            None => Err(RegistryError::Network(err)),
        }
    }
}
