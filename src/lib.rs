//! Facade crate for geoset.
//!
//! This crate re-exports the core domain types and exposes registry access
//! and accessor module generation behind feature flags.

#![forbid(unsafe_code)]

pub use geoset_core::{
    City, Config, ConfigError, CountryCode, CountryCodeError, CountryDataset, CountrySummary,
    LocalizedName, Payload, Region, RegistryIndex, Schema, ValidationError, project,
};

#[cfg(feature = "registry")]
pub use geoset_registry::{
    CacheStore, FetchError, HttpSource, InstallError, InstallReport, LocalSource, Outcome,
    RegistryEndpoint, RegistryError, RegistryLocation, RegistryService, RegistrySource,
    RegistryWarning, Resolution, WarningSink, install, refresh, remove,
};

#[cfg(feature = "codegen")]
pub use geoset_codegen::{CodegenError, GeneratedModule, OutputMode, generate, render};
