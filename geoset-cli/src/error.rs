//! Error types emitted by the geoset CLI.
//!
//! Library failures are wrapped rather than re-described so the message chain
//! printed by the binary keeps the path or URL that caused the failure.

use std::sync::Arc;

use camino::Utf8PathBuf;
use geoset_codegen::CodegenError;
use geoset_core::{ConfigError, CountryCodeError, ValidationError};
use geoset_registry::{CacheError, InstallError, RegistryError, SourceError};
use thiserror::Error;

/// Errors emitted by the geoset CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// The project configuration is invalid or unreadable.
    #[error(transparent)]
    Project(#[from] ConfigError),
    /// No project configuration exists yet.
    #[error("no project configuration at {path} (run `geoset init` first)")]
    NotInitialised { path: Utf8PathBuf },
    /// The configuration path could not be inspected.
    #[error("failed to inspect {path}: {source}")]
    InspectConfig {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A country code argument was malformed.
    #[error(transparent)]
    InvalidCode(#[from] CountryCodeError),
    /// No cache directory could be derived from the environment.
    #[error("cannot locate a cache directory (set --cache-dir or {env})")]
    CacheDirUnavailable { env: &'static str },
    /// The registry source could not be constructed.
    #[error(transparent)]
    Source(#[from] SourceError),
    /// The registry could not be reached and nothing usable was cached.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// Writing datasets into the project failed.
    #[error(transparent)]
    Install(#[from] InstallError),
    /// The cache could not be cleared.
    #[error(transparent)]
    Cache(#[from] CacheError),
    /// The accessor module could not be generated.
    #[error(transparent)]
    Codegen(#[from] CodegenError),
    /// The requested country is not listed in the registry index.
    #[error("country {code} is not available in the registry")]
    NotFound { code: String },
    /// The registry served a payload that failed validation.
    #[error("registry data for {subject} is invalid: {source}")]
    InvalidPayload {
        subject: String,
        #[source]
        source: ValidationError,
    },
    /// The async runtime could not be started.
    #[error("failed to start the async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// Writing command output failed.
    #[error("failed to write command output: {0}")]
    WriteOutput(#[from] std::io::Error),
}
