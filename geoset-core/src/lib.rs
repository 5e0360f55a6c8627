//! Core domain types for geoset.
//!
//! The registry index, country datasets and consumer configuration live here,
//! together with the two pure operations every other crate builds on:
//! [`Schema::validate`], which turns an untyped [`Payload`] into typed data or
//! reports the first violated constraint, and [`project`], which narrows a
//! validated dataset to a consumer's languages and coordinate preference.
//!
//! Constructors return `Result` to surface invalid input early; nothing in
//! this crate performs network access.

#![forbid(unsafe_code)]

mod code;
mod config;
mod filter;
mod model;
mod schema;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use code::{CountryCode, CountryCodeError, DATASET_EXTENSION, installed_codes};
pub use config::{CONFIG_FILE_NAME, Config, ConfigError};
pub use filter::project;
pub use model::{City, CountryDataset, CountrySummary, ENGLISH, LocalizedName, Region, RegistryIndex};
pub use schema::{Payload, Schema, ValidationError};

/// File name of the summary index materialised beside the dataset files.
pub const INDEX_FILE_NAME: &str = "index.json";
