//! Typed representation of the registry index and country datasets.
//!
//! Values of these types are only ever produced by
//! [`Schema::validate`](crate::Schema::validate) or by projecting an already
//! validated dataset, so the invariants documented on each field hold for
//! every instance a caller sees.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::CountryCode;

/// Language tag that every displayable entity must carry.
pub const ENGLISH: &str = "en";

/// Multilingual label keyed by language tag.
///
/// Backed by a [`BTreeMap`] so serialised datasets keep a stable key order.
///
/// # Examples
/// ```
/// use geoset_core::LocalizedName;
///
/// let name = LocalizedName::from_pairs([("en", "Doha"), ("ar", "الدوحة")]);
/// assert_eq!(name.resolve("ar"), Some("الدوحة"));
/// assert_eq!(name.resolve("ja"), Some("Doha"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedName(BTreeMap<String, String>);

impl LocalizedName {
    /// Build a name from `(language, label)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(lang, label)| (lang.into(), label.into()))
                .collect(),
        )
    }

    /// Label for `lang`, if present.
    #[must_use]
    pub fn get(&self, lang: &str) -> Option<&str> {
        self.0.get(lang).map(String::as_str)
    }

    /// English label, if present.
    #[must_use]
    pub fn english(&self) -> Option<&str> {
        self.get(ENGLISH)
    }

    /// Resolve a display label: `lang`, then English, then the first key.
    #[must_use]
    pub fn resolve(&self, lang: &str) -> Option<&str> {
        self.get(lang)
            .or_else(|| self.english())
            .or_else(|| self.0.values().next().map(String::as_str))
    }

    /// Whether a label exists for `lang`.
    #[must_use]
    pub fn contains(&self, lang: &str) -> bool {
        self.0.contains_key(lang)
    }

    /// Iterate over `(language, label)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(lang, label)| (lang.as_str(), label.as_str()))
    }

    /// Number of languages carried.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no language is carried.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn insert(&mut self, lang: impl Into<String>, label: impl Into<String>) {
        self.0.insert(lang.into(), label.into());
    }
}

/// Summary of one country as listed in the registry index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountrySummary {
    /// Display names; always includes a non-empty English label.
    pub name: LocalizedName,
    /// Flag emoji.
    pub flag: String,
    /// Languages spoken in the country, in registry order.
    pub languages: Vec<String>,
}

/// Registry-wide table of contents mapping codes to summaries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryIndex {
    /// Registry data version.
    pub version: String,
    /// Summaries keyed by lowercase country code.
    pub countries: BTreeMap<CountryCode, CountrySummary>,
}

impl RegistryIndex {
    /// Look up the summary for `code`.
    #[must_use]
    pub fn get(&self, code: &CountryCode) -> Option<&CountrySummary> {
        self.countries.get(code)
    }

    /// Whether the registry lists `code`.
    #[must_use]
    pub fn contains(&self, code: &CountryCode) -> bool {
        self.countries.contains_key(code)
    }
}

/// Full country → regions → cities tree for one country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryDataset {
    /// Two-letter country code.
    pub code: CountryCode,
    /// Optional three-letter code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iso3: Option<String>,
    /// Display names; always includes English.
    pub name: LocalizedName,
    /// International dialling prefix.
    pub phone: String,
    /// Currency code.
    pub currency: String,
    /// Primary IANA time zone.
    pub timezone: String,
    /// Flag emoji.
    pub flag: String,
    /// Regions in registry order.
    pub regions: Vec<Region>,
}

impl CountryDataset {
    /// Iterate over every city in region order.
    pub fn cities(&self) -> impl Iterator<Item = &City> {
        self.regions.iter().flat_map(|region| region.cities.iter())
    }

    /// Find a region by its code.
    #[must_use]
    pub fn region(&self, code: &str) -> Option<&Region> {
        self.regions.iter().find(|region| region.code == code)
    }
}

/// Administrative region within a country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// Code unique within the parent country.
    pub code: String,
    /// Display names.
    pub name: LocalizedName,
    /// Cities in registry order.
    pub cities: Vec<City>,
}

/// A city with optional coordinates.
///
/// Latitude and longitude are independent: either may be present without the
/// other, and `Some(0.0)` is a genuine position on the equator or the prime
/// meridian rather than a missing value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    /// Display names; always includes English.
    pub name: LocalizedName,
    /// Latitude in decimal degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}
