//! Error types produced by the registry access layer.

use std::{io, time::Duration};

use camino::Utf8PathBuf;
use geoset_core::ValidationError;
use thiserror::Error;

/// Failures retrieving a payload from a registry source.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FetchError {
    /// The server returned an HTTP error status.
    #[error("request to {url} failed with status {status}: {message}")]
    Http {
        /// Fully qualified request URL.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Short error description.
        message: String,
    },
    /// The request failed in transport.
    #[error("network error contacting {url}: {source}")]
    Network {
        /// Fully qualified request URL.
        url: String,
        /// I/O error reported by the transport.
        source: io::Error,
    },
    /// No response arrived within the deadline; the request was dropped.
    #[error("request to {url} timed out after {after:?}")]
    Timeout {
        /// Fully qualified request URL.
        url: String,
        /// Deadline that elapsed.
        after: Duration,
    },
    /// A local registry file could not be read.
    #[error("failed to read local registry file {path}: {source}")]
    Local {
        /// File that was requested.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
}

/// Failures building a registry source.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SourceError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
    /// The registry location override could not be interpreted.
    #[error("invalid registry location {value:?}: {reason}")]
    InvalidLocation {
        /// Raw override value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Failures persisting or clearing cache entries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CacheError {
    /// The payload could not be encoded for storage.
    #[error("failed to encode cache entry {key}: {source}")]
    Encode {
        /// Cache key being written.
        key: String,
        /// Underlying serialisation error.
        source: serde_json::Error,
    },
    /// Writing the entry file failed.
    #[error("failed to write cache entry {path}: {source}")]
    Write {
        /// Entry file path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// Removing entries failed.
    #[error("failed to clear cache at {path}: {source}")]
    Clear {
        /// Path that could not be removed.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
}

/// Failures resolving registry data that no cached copy could cover.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RegistryError {
    /// The source was unreachable and nothing was cached for the key.
    #[error("registry unavailable: {0}")]
    Network(#[from] FetchError),
}

/// Failures materialising datasets into a project directory.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InstallError {
    /// Resolving registry data failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// Reading or writing a project file failed.
    #[error("failed to access {path}: {source}")]
    Io {
        /// File or directory involved.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// A dataset or index could not be encoded.
    #[error("failed to encode {path}: {source}")]
    Encode {
        /// Target file.
        path: Utf8PathBuf,
        /// Underlying serialisation error.
        source: serde_json::Error,
    },
    /// The local summary index exists but is malformed.
    #[error("local index {path} is invalid: {source}")]
    LocalIndex {
        /// Index file path.
        path: Utf8PathBuf,
        /// First violated constraint.
        source: ValidationError,
    },
}
