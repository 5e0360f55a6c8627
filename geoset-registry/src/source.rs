//! Bounded-time retrieval of raw registry payloads.

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use camino::Utf8PathBuf;
use reqwest::Client;
use reqwest::header::USER_AGENT;

use crate::{BaseUrl, FetchError, RegistryLocation, SourceError};

/// Default user agent for registry requests.
pub const DEFAULT_USER_AGENT: &str = "geoset/0.1";

/// Seconds a remote fetch may take before it is abandoned.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Somewhere registry payloads can be fetched from.
#[async_trait(?Send)]
pub trait RegistrySource {
    /// Where this source reads from.
    fn location(&self) -> &RegistryLocation;

    /// Whether fetched payloads go through the cache policy.
    fn is_remote(&self) -> bool {
        self.location().is_remote()
    }

    /// Fetch the raw bytes stored at `path` below the source's base.
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, FetchError>;
}

/// HTTP implementation of [`RegistrySource`].
///
/// The whole request, body included, runs under one deadline. When it
/// elapses the request future is dropped, which cancels the transfer, and
/// [`FetchError::Timeout`] is returned.
#[derive(Debug)]
pub struct HttpSource {
    client: Client,
    base_url: BaseUrl,
    location: RegistryLocation,
    timeout: Duration,
    user_agent: String,
}

impl HttpSource {
    /// Construct an HTTP-backed source rooted at `base_url`.
    pub fn new(base_url: BaseUrl) -> Result<Self, SourceError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            location: RegistryLocation::Remote(base_url.clone()),
            base_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
        })
    }

    /// Override the fetch deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the default user agent string.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    async fn call(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, self.user_agent.as_str())
            .send()
            .await
            .map_err(|err| convert_reqwest_error(err, url))?
            .error_for_status()
            .map_err(|err| convert_reqwest_error(err, url))?;
        let body = response
            .bytes()
            .await
            .map_err(|err| convert_reqwest_error(err, url))?;
        Ok(body.to_vec())
    }
}

#[async_trait(?Send)]
impl RegistrySource for HttpSource {
    fn location(&self) -> &RegistryLocation {
        &self.location
    }

    async fn fetch(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        let url = self.base_url.join(path);
        log::debug!("fetching {url}");
        match tokio::time::timeout(self.timeout, self.call(&url)).await {
            Ok(outcome) => outcome,
            Err(_elapsed) => Err(FetchError::Timeout {
                url,
                after: self.timeout,
            }),
        }
    }
}

/// Filesystem implementation of [`RegistrySource`] for local mirrors.
#[derive(Debug, Clone)]
pub struct LocalSource {
    dir: Utf8PathBuf,
    location: RegistryLocation,
}

impl LocalSource {
    /// Construct a source reading files below `dir`.
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            location: RegistryLocation::Local(dir.clone()),
            dir,
        }
    }
}

#[async_trait(?Send)]
impl RegistrySource for LocalSource {
    fn location(&self) -> &RegistryLocation {
        &self.location
    }

    async fn fetch(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        let file = self.dir.join(path);
        tokio::fs::read(file.as_std_path())
            .await
            .map_err(|source| FetchError::Local { path: file, source })
    }
}

/// Source chosen from a [`RegistryLocation`] at start-up.
#[derive(Debug)]
pub enum RegistryEndpoint {
    /// Remote registry over HTTP.
    Http(HttpSource),
    /// Local mirror directory.
    Local(LocalSource),
}

impl RegistryEndpoint {
    /// Build the source matching `location`.
    ///
    /// # Examples
    /// ```
    /// # use geoset_registry::{RegistryEndpoint, RegistryLocation, RegistrySource};
    /// let endpoint = RegistryEndpoint::from_location(RegistryLocation::parse("./mirror")?)?;
    /// assert!(!endpoint.is_remote());
    /// # Ok::<(), geoset_registry::SourceError>(())
    /// ```
    pub fn from_location(location: RegistryLocation) -> Result<Self, SourceError> {
        match location {
            RegistryLocation::Remote(base) => HttpSource::new(base).map(Self::Http),
            RegistryLocation::Local(dir) => Ok(Self::Local(LocalSource::new(dir))),
        }
    }
}

#[async_trait(?Send)]
impl RegistrySource for RegistryEndpoint {
    fn location(&self) -> &RegistryLocation {
        match self {
            Self::Http(source) => source.location(),
            Self::Local(source) => source.location(),
        }
    }

    async fn fetch(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        match self {
            Self::Http(source) => source.fetch(path).await,
            Self::Local(source) => source.fetch(path).await,
        }
    }
}

fn convert_reqwest_error(error: reqwest::Error, url: &str) -> FetchError {
    if let Some(status) = error.status() {
        return FetchError::Http {
            url: url.to_owned(),
            status: status.as_u16(),
            message: error.to_string(),
        };
    }

    let kind = if error.is_timeout() {
        io::ErrorKind::TimedOut
    } else {
        io::ErrorKind::Other
    };
    FetchError::Network {
        url: url.to_owned(),
        source: io::Error::new(kind, error),
    }
}
