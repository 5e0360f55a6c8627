//! Registry access for geoset.
//!
//! Responsibilities:
//! - Fetch raw payloads from a remote registry or a local mirror within a
//!   bounded time ([`RegistrySource`]).
//! - Persist validated payloads with per-key freshness ([`CacheStore`]).
//! - Resolve the index and datasets under the validate-before-cache and
//!   stale-fallback policy ([`RegistryService`]).
//! - Materialise resolved datasets into a project directory ([`install`]).
//!
//! Boundaries:
//! - Shape contracts and projection live in `geoset-core`.
//! - Presentation of warnings and errors belongs to the caller; warnings are
//!   routed through a [`WarningSink`].
//!
//! Invariants:
//! - The cache never holds a payload that failed validation.
//! - No global mutable state; the cache root is injected.
#![forbid(unsafe_code)]

mod cache;
mod error;
mod install;
mod service;
mod source;
mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use cache::{CacheKey, CacheStats, CacheStore, Clock, SystemClock};
pub use error::{CacheError, FetchError, InstallError, RegistryError, SourceError};
pub use install::{
    InstallReport, Outcome, install, installed_codes, read_local_index, refresh, remove,
};
pub use service::{
    DATASET_FRESHNESS, INDEX_FRESHNESS, LogWarnings, RegistryService, RegistryWarning, Resolution,
    WarningSink,
};
pub use source::{
    DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, HttpSource, LocalSource, RegistryEndpoint,
    RegistrySource,
};
pub use types::{BaseUrl, DEFAULT_REGISTRY_URL, REGISTRY_URL_ENV, RegistryLocation};
