//! Canonical sample payloads shared by unit and behaviour tests across the
//! workspace.

use serde_json::{Value, json};

use crate::{CountryDataset, Payload, RegistryIndex, Schema};

/// Registry index listing Saudi Arabia, Qatar and the United States.
#[must_use]
pub fn sample_index_json() -> Value {
    json!({
        "version": "2024.06",
        "countries": {
            "sa": {
                "name": { "en": "Saudi Arabia", "ar": "السعودية" },
                "flag": "🇸🇦",
                "languages": ["ar"]
            },
            "qa": {
                "name": { "en": "Qatar", "ar": "قطر" },
                "flag": "🇶🇦",
                "languages": ["ar"]
            },
            "us": {
                "name": { "en": "United States" },
                "flag": "🇺🇸",
                "languages": ["en"]
            }
        }
    })
}

/// Saudi Arabian dataset with a multilingual city and a city on the equator.
///
/// The second region's city deliberately sits at latitude `0` and carries no
/// longitude so zero-versus-absent handling is exercised.
#[must_use]
pub fn sample_dataset_json() -> Value {
    json!({
        "code": "sa",
        "iso3": "SAU",
        "name": { "en": "Saudi Arabia", "ar": "السعودية", "fr": "Arabie saoudite" },
        "phone": "+966",
        "currency": "SAR",
        "timezone": "Asia/Riyadh",
        "flag": "🇸🇦",
        "regions": [
            {
                "code": "01",
                "name": { "en": "Riyadh Region", "ar": "منطقة الرياض" },
                "cities": [
                    {
                        "name": { "en": "Riyadh", "ar": "الرياض", "fr": "Riyad" },
                        "latitude": 24.7136
                    }
                ]
            },
            {
                "code": "02",
                "name": { "fr": "Région équatoriale", "en": "Equator Region" },
                "cities": [
                    {
                        "name": { "en": "Null Island" },
                        "latitude": 0
                    }
                ]
            }
        ]
    })
}

/// Minimal dataset for `code` with one region and one city.
#[must_use]
pub fn minimal_dataset_json(code: &str, english_name: &str) -> Value {
    json!({
        "code": code,
        "name": { "en": english_name },
        "phone": "+1",
        "currency": "USD",
        "timezone": "UTC",
        "flag": "🏳",
        "regions": [
            {
                "code": "r1",
                "name": { "en": format!("{english_name} Region") },
                "cities": [ { "name": { "en": format!("{english_name} City") } } ]
            }
        ]
    })
}

/// Validated form of [`sample_index_json`].
///
/// # Panics
/// Panics when the sample no longer satisfies the index schema.
#[must_use]
pub fn sample_index() -> RegistryIndex {
    match RegistryIndex::validate(&Payload::from_value(sample_index_json())) {
        Ok(index) => index,
        Err(err) => panic!("sample index should validate: {err}"),
    }
}

/// Validated form of [`sample_dataset_json`].
///
/// # Panics
/// Panics when the sample no longer satisfies the dataset schema.
#[must_use]
pub fn sample_dataset() -> CountryDataset {
    match CountryDataset::validate(&Payload::from_value(sample_dataset_json())) {
        Ok(dataset) => dataset,
        Err(err) => panic!("sample dataset should validate: {err}"),
    }
}
