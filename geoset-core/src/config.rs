//! Consumer configuration for projection and code generation.

use std::collections::BTreeSet;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File name of the persisted project configuration.
pub const CONFIG_FILE_NAME: &str = "geoset.config.json";

/// Errors returned by [`Config::new`] and [`Config::load`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The output directory was empty.
    #[error("output directory must not be empty")]
    EmptyOutputDir,
    /// No language tags were supplied.
    #[error("at least one language must be selected")]
    NoLanguages,
    /// A language tag was blank.
    #[error("language tags must not be blank")]
    BlankLanguage,
    /// Reading the configuration file failed.
    #[error("failed to read configuration at {path:?}: {source}")]
    Read {
        /// Location of the configuration file.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// The configuration file was not valid JSON for [`Config`].
    #[error("failed to parse configuration at {path:?}: {source}")]
    Parse {
        /// Location of the configuration file.
        path: Utf8PathBuf,
        /// Underlying decode error.
        #[source]
        source: serde_json::Error,
    },
    /// Writing the configuration file failed.
    #[error("failed to write configuration at {path:?}: {source}")]
    Write {
        /// Location of the configuration file.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Consumer settings controlling which data is materialised and how.
///
/// # Examples
/// ```
/// use geoset_core::Config;
///
/// # fn main() -> Result<(), geoset_core::ConfigError> {
/// let config = Config::new("src/geo", ["ar"], false, true)?;
/// assert!(config.wants_language("ar"));
/// assert!(!config.wants_language("fr"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawConfig")]
pub struct Config {
    output_dir: Utf8PathBuf,
    languages: BTreeSet<String>,
    include_coordinates: bool,
    typescript: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    output_dir: Utf8PathBuf,
    languages: Vec<String>,
    #[serde(default)]
    include_coordinates: bool,
    #[serde(default)]
    typescript: bool,
}

impl TryFrom<RawConfig> for Config {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        Self::new(
            raw.output_dir,
            raw.languages,
            raw.include_coordinates,
            raw.typescript,
        )
    }
}

impl Config {
    /// Validate and construct a configuration.
    pub fn new<P, I, S>(
        output_dir: P,
        languages: I,
        include_coordinates: bool,
        typescript: bool,
    ) -> Result<Self, ConfigError>
    where
        P: Into<Utf8PathBuf>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let output_dir = output_dir.into();
        if output_dir.as_str().trim().is_empty() {
            return Err(ConfigError::EmptyOutputDir);
        }
        let mut selected = BTreeSet::new();
        for lang in languages {
            let lang = lang.into();
            let trimmed = lang.trim();
            if trimmed.is_empty() {
                return Err(ConfigError::BlankLanguage);
            }
            selected.insert(trimmed.to_owned());
        }
        if selected.is_empty() {
            return Err(ConfigError::NoLanguages);
        }
        Ok(Self {
            output_dir,
            languages: selected,
            include_coordinates,
            typescript,
        })
    }

    /// Directory datasets and the accessor module are written to.
    #[must_use]
    pub fn output_dir(&self) -> &Utf8Path {
        &self.output_dir
    }

    /// Selected language tags.
    #[must_use]
    pub fn languages(&self) -> &BTreeSet<String> {
        &self.languages
    }

    /// Whether `lang` is selected.
    #[must_use]
    pub fn wants_language(&self, lang: &str) -> bool {
        self.languages.contains(lang)
    }

    /// Whether city coordinates are kept.
    #[must_use]
    pub const fn include_coordinates(&self) -> bool {
        self.include_coordinates
    }

    /// Whether the generated accessor module carries type annotations.
    #[must_use]
    pub const fn typescript(&self) -> bool {
        self.typescript
    }

    /// Load a configuration file, re-running validation.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let bytes = geoset_fs::read_bytes(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Persist the configuration as pretty JSON.
    pub fn save(&self, path: &Utf8Path) -> Result<(), ConfigError> {
        let mut bytes = serde_json::to_vec_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        bytes.push(b'\n');
        geoset_fs::write_atomic(path, &bytes).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
