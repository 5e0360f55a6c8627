//! Registry location wrappers.

use std::{fmt, ops::Deref};

use camino::{Utf8Path, Utf8PathBuf};
use url::Url;

use crate::SourceError;

/// Environment variable overriding the registry location.
pub const REGISTRY_URL_ENV: &str = "GEOSET_REGISTRY_URL";

/// Canonical remote registry used when no override is set.
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.geoset.dev/v1";

/// Base URL of a remote registry, stored without a trailing slash.
///
/// # Examples
/// ```
/// # use geoset_registry::BaseUrl;
/// let url = BaseUrl::new("https://registry.example/data/");
/// assert_eq!(url.as_ref(), "https://registry.example/data");
/// assert_eq!(url.join("sa.json"), "https://registry.example/data/sa.json");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl(String);

impl BaseUrl {
    /// Construct a [`BaseUrl`], trimming trailing slashes.
    pub fn new(value: impl Into<String>) -> Self {
        let raw = value.into();
        Self(raw.trim_end_matches('/').to_owned())
    }

    /// Absolute URL of `path` below this base.
    #[must_use]
    pub fn join(&self, path: &str) -> String {
        format!("{}/{}", self.0, path.trim_start_matches('/'))
    }

    /// Consume the wrapper and return the inner [`String`].
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<&str> for BaseUrl {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for BaseUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for BaseUrl {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where registry payloads come from.
///
/// Remote locations go through the cache and validation policy; local
/// directories are treated as an already-canonical mirror and bypass both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryLocation {
    /// An HTTP(S) registry.
    Remote(BaseUrl),
    /// A directory holding `index.json` and `<code>.json` files.
    Local(Utf8PathBuf),
}

impl RegistryLocation {
    /// Resolve the location from [`REGISTRY_URL_ENV`], falling back to the default.
    pub fn from_env() -> Result<Self, SourceError> {
        match std::env::var(REGISTRY_URL_ENV) {
            Ok(value) if !value.trim().is_empty() => Self::parse(&value),
            _ => Ok(Self::default()),
        }
    }

    /// Interpret an override value.
    ///
    /// `http://` and `https://` URLs name a remote registry, `file://` URLs
    /// and plain paths a local one.
    ///
    /// # Examples
    /// ```
    /// # use geoset_registry::RegistryLocation;
    /// let remote = RegistryLocation::parse("https://mirror.example/geo").expect("url");
    /// assert!(remote.is_remote());
    /// let local = RegistryLocation::parse("./registry").expect("path");
    /// assert!(!local.is_remote());
    /// ```
    pub fn parse(value: &str) -> Result<Self, SourceError> {
        let value = value.trim();
        let invalid = |reason: &str| SourceError::InvalidLocation {
            value: value.to_owned(),
            reason: reason.to_owned(),
        };
        match Url::parse(value) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {
                Ok(Self::Remote(BaseUrl::new(value)))
            }
            Ok(url) if url.scheme() == "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|()| invalid("file URL does not name a local path"))?;
                Utf8PathBuf::from_path_buf(path)
                    .map(Self::Local)
                    .map_err(|_| invalid("path is not valid UTF-8"))
            }
            // Single-letter schemes are Windows drive prefixes, not URLs.
            Ok(url) if url.scheme().len() > 1 => Err(invalid("unsupported URL scheme")),
            _ => Ok(Self::Local(Utf8PathBuf::from(value))),
        }
    }

    /// Whether payloads from this location are subject to caching.
    #[must_use]
    pub const fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    /// Local directory, when the location is local.
    #[must_use]
    pub fn local_dir(&self) -> Option<&Utf8Path> {
        match self {
            Self::Local(dir) => Some(dir),
            Self::Remote(_) => None,
        }
    }
}

impl Default for RegistryLocation {
    fn default() -> Self {
        Self::Remote(BaseUrl::from(DEFAULT_REGISTRY_URL))
    }
}

impl fmt::Display for RegistryLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(url) => fmt::Display::fmt(url, f),
            Self::Local(dir) => fmt::Display::fmt(dir, f),
        }
    }
}
