//! Accessor module generation for installed geoset datasets.
//!
//! After datasets have been materialised into a project's output directory,
//! [`generate`] lists the `<code>.json` files found there and writes a single
//! JavaScript or TypeScript module beside them. The module imports every
//! dataset and exposes lookup helpers (`getCountry`, `getRegions`,
//! `getCities`, `getAllCities`, `getLocalizedName`, `getCountryCodes` and
//! `isValidCountryCode`). [`render`] produces the module text without touching
//! the filesystem.
//!
//! # Examples
//!
//! ```no_run
//! use geoset_codegen::generate;
//! use geoset_core::Config;
//!
//! let config = Config::new("src/data", ["en"], false, true).expect("valid config");
//! let module = generate(&config).expect("write accessor module");
//! println!("wrote {} countries to {}", module.codes.len(), module.path);
//! ```

#![forbid(unsafe_code)]

use camino::Utf8PathBuf;
use geoset_core::{Config, CountryCode};

mod error;
mod render;

pub use error::CodegenError;
pub use render::{OutputMode, render};

/// Summary of a module written by [`generate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedModule {
    /// Path of the module file.
    pub path: Utf8PathBuf,
    /// Codes imported by the module, sorted.
    pub codes: Vec<CountryCode>,
    /// Language the module was rendered in.
    pub mode: OutputMode,
}

/// Write the accessor module for every dataset installed under
/// `config.output_dir()`.
///
/// The summary `index.json` and files not named after a country code are
/// ignored. A missing output directory yields a module with no countries.
///
/// # Errors
///
/// Returns [`CodegenError::ListDatasets`] when the output directory cannot be
/// read and [`CodegenError::WriteModule`] when the module cannot be written.
pub fn generate(config: &Config) -> Result<GeneratedModule, CodegenError> {
    let output_dir = config.output_dir();
    let codes =
        geoset_core::installed_codes(output_dir).map_err(|source| CodegenError::ListDatasets {
            path: output_dir.to_path_buf(),
            source,
        })?;
    let mode = OutputMode::from_typescript(config.typescript());
    let path = output_dir.join(mode.file_name());
    let module = render(&codes, mode);
    geoset_fs::write_atomic(&path, module.as_bytes()).map_err(|source| {
        CodegenError::WriteModule {
            path: path.clone(),
            source,
        }
    })?;
    log::info!("generated {path} with {} countries", codes.len());
    Ok(GeneratedModule { path, codes, mode })
}

#[cfg(test)]
mod tests;
