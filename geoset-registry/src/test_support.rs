//! Shared fixtures for registry tests.
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::future::Future;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::runtime::Builder;

use crate::{BaseUrl, Clock, FetchError, RegistryLocation, RegistrySource, RegistryWarning, WarningSink};

/// Failure a [`StubSource`] can be told to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubFailure {
    /// Connection refused.
    Unreachable,
    /// The deadline elapsed.
    Timeout,
    /// The server answered with this status.
    Status(u16),
}

#[derive(Debug, Clone)]
enum StubResponse {
    Body(Vec<u8>),
    Fail(StubFailure),
}

/// In-memory [`RegistrySource`] that counts fetches.
///
/// Paths without a configured response fail with a 404.
#[derive(Debug)]
pub struct StubSource {
    location: RegistryLocation,
    responses: RefCell<BTreeMap<String, StubResponse>>,
    calls: Cell<usize>,
}

impl StubSource {
    /// A stub posing as a remote registry.
    #[must_use]
    pub fn remote() -> Self {
        Self::at(RegistryLocation::Remote(BaseUrl::from("https://registry.test")))
    }

    /// A stub posing as a local mirror, which bypasses the cache.
    #[must_use]
    pub fn local() -> Self {
        Self::at(RegistryLocation::Local("mirror".into()))
    }

    fn at(location: RegistryLocation) -> Self {
        Self {
            location,
            responses: RefCell::new(BTreeMap::new()),
            calls: Cell::new(0),
        }
    }

    /// Serve `body` for `path`.
    pub fn respond(&self, path: &str, body: impl Into<Vec<u8>>) {
        self.responses
            .borrow_mut()
            .insert(path.to_owned(), StubResponse::Body(body.into()));
    }

    /// Serve `value` encoded as JSON for `path`.
    pub fn respond_json(&self, path: &str, value: &serde_json::Value) {
        self.respond(path, value.to_string());
    }

    /// Fail every request for `path`.
    pub fn fail(&self, path: &str, failure: StubFailure) {
        self.responses
            .borrow_mut()
            .insert(path.to_owned(), StubResponse::Fail(failure));
    }

    /// Fail every configured path as if the network were down.
    pub fn go_offline(&self) {
        for response in self.responses.borrow_mut().values_mut() {
            *response = StubResponse::Fail(StubFailure::Unreachable);
        }
    }

    /// Number of fetches issued so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

#[async_trait(?Send)]
impl RegistrySource for StubSource {
    fn location(&self) -> &RegistryLocation {
        &self.location
    }

    async fn fetch(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        self.calls.set(self.calls.get() + 1);
        let url = format!("{}/{path}", self.location);
        let response = self.responses.borrow().get(path).cloned();
        match response {
            Some(StubResponse::Body(bytes)) => Ok(bytes),
            Some(StubResponse::Fail(StubFailure::Unreachable)) => Err(FetchError::Network {
                url,
                source: io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
            }),
            Some(StubResponse::Fail(StubFailure::Timeout)) => Err(FetchError::Timeout {
                url,
                after: Duration::from_secs(crate::DEFAULT_TIMEOUT_SECS),
            }),
            Some(StubResponse::Fail(StubFailure::Status(status))) => Err(FetchError::Http {
                url,
                status,
                message: format!("status {status}"),
            }),
            None => Err(FetchError::Http {
                url,
                status: 404,
                message: "not found".to_owned(),
            }),
        }
    }
}

/// [`Clock`] that only moves when told to. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock(Rc<Cell<u64>>);

impl ManualClock {
    /// A clock reading `secs` since the unix epoch.
    #[must_use]
    pub fn at(secs: u64) -> Self {
        Self(Rc::new(Cell::new(secs)))
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        self.0.set(self.0.get().saturating_add(by.as_secs()));
    }
}

impl Clock for ManualClock {
    fn now_secs(&self) -> u64 {
        self.0.get()
    }
}

/// [`WarningSink`] that keeps every warning for later inspection.
#[derive(Debug, Default)]
pub struct RecordingWarnings(RefCell<Vec<RegistryWarning>>);

impl RecordingWarnings {
    /// Number of warnings recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Rendered warning messages in emission order.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.0.borrow().iter().map(ToString::to_string).collect()
    }

    /// Apply `check` to the recorded warnings.
    pub fn inspect<R>(&self, check: impl FnOnce(&[RegistryWarning]) -> R) -> R {
        check(&self.0.borrow())
    }
}

impl WarningSink for RecordingWarnings {
    fn warn(&self, warning: RegistryWarning) {
        self.0.borrow_mut().push(warning);
    }
}

/// Drive `future` to completion on a fresh current-thread runtime.
pub fn block_on_for_tests<F: Future>(future: F) -> F::Output {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|err| panic!("failed to build Tokio runtime: {err}"))
        .block_on(future)
}
