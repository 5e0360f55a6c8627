//! Two-letter country codes.

use std::{fmt, io, ops::Deref, str::FromStr};

use camino::Utf8Path;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Extension shared by dataset files and the installed index.
pub const DATASET_EXTENSION: &str = "json";

/// Lowercase ISO 3166-1 alpha-2 style code identifying one country dataset.
///
/// Parsing accepts either case and normalises to lowercase, which is the form
/// used for cache keys and dataset file names. Generated accessor modules
/// present the uppercase form via [`CountryCode::to_upper`].
///
/// # Examples
/// ```
/// use geoset_core::CountryCode;
///
/// let code: CountryCode = "SA".parse().expect("valid code");
/// assert_eq!(code.as_ref(), "sa");
/// assert_eq!(code.to_upper(), "SA");
/// assert_eq!(code.file_name(), "sa.json");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CountryCode(String);

/// Errors returned when parsing a [`CountryCode`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("country code {input:?} must be exactly two ASCII letters")]
pub struct CountryCodeError {
    /// The rejected input.
    pub input: String,
}

impl CountryCode {
    /// Parse `value`, accepting upper or lower case.
    pub fn parse(value: &str) -> Result<Self, CountryCodeError> {
        let valid = value.len() == 2 && value.bytes().all(|byte| byte.is_ascii_alphabetic());
        if valid {
            Ok(Self(value.to_ascii_lowercase()))
        } else {
            Err(CountryCodeError {
                input: value.to_owned(),
            })
        }
    }

    /// Uppercase rendering used by generated modules.
    #[must_use]
    pub fn to_upper(&self) -> String {
        self.0.to_ascii_uppercase()
    }

    /// Name of the dataset file materialised for this code.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.{DATASET_EXTENSION}", self.0)
    }

    /// Recover the code from a dataset file name such as `sa.json`.
    ///
    /// Returns `None` for any other file, including uppercase names, so the
    /// summary index and unrelated files are never mistaken for datasets.
    #[must_use]
    pub fn from_file_name(name: &str) -> Option<Self> {
        let stem = name.strip_suffix(DATASET_EXTENSION)?.strip_suffix('.')?;
        if stem.bytes().all(|byte| byte.is_ascii_lowercase()) {
            Self::parse(stem).ok()
        } else {
            None
        }
    }
}

impl FromStr for CountryCode {
    type Err = CountryCodeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl AsRef<str> for CountryCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for CountryCode {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for CountryCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for CountryCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Codes of the datasets materialised in `dir`, sorted.
///
/// Only files named `<code>.json` count; the summary index and any other file
/// are skipped. A missing directory holds no datasets.
pub fn installed_codes(dir: &Utf8Path) -> io::Result<Vec<CountryCode>> {
    let names = match geoset_fs::list_file_names(dir) {
        Ok(names) => names,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err),
    };
    let mut codes: Vec<CountryCode> = names
        .iter()
        .filter_map(|name| CountryCode::from_file_name(name))
        .collect();
    codes.sort();
    Ok(codes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("sa", "sa")]
    #[case("US", "us")]
    #[case("Qa", "qa")]
    fn parses_and_normalises(#[case] input: &str, #[case] expected: &str) {
        let code = CountryCode::parse(input).expect("valid code");
        assert_eq!(code.as_ref(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("s")]
    #[case("sau")]
    #[case("s1")]
    #[case("é1")]
    fn rejects_malformed_codes(#[case] input: &str) {
        let err = CountryCode::parse(input).expect_err("malformed code");
        assert_eq!(err.input, input);
    }

    #[rstest]
    #[case("sa.json", Some("sa"))]
    #[case("index.json", None)]
    #[case("SA.json", None)]
    #[case("sa.ts", None)]
    #[case("sa.json.tmp", None)]
    #[case("countries.js", None)]
    fn recognises_dataset_file_names(#[case] name: &str, #[case] expected: Option<&str>) {
        let code = CountryCode::from_file_name(name);
        assert_eq!(code.as_deref(), expected);
    }

    #[rstest]
    fn installed_codes_skip_index_and_missing_dirs() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let root = Utf8Path::from_path(dir.path()).expect("utf-8 tempdir");
        assert!(installed_codes(&root.join("absent")).expect("missing dir").is_empty());
        for name in ["us.json", "index.json", "sa.json", "countries.ts"] {
            geoset_fs::write_atomic(&root.join(name), b"{}").expect("write fixture");
        }
        let codes: Vec<String> = installed_codes(root)
            .expect("list codes")
            .iter()
            .map(CountryCode::to_upper)
            .collect();
        assert_eq!(codes, vec!["SA", "US"]);
    }
}
