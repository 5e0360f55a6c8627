//! Structural validation of untyped registry payloads.
//!
//! Network and file payloads arrive as a [`Payload`], an opaque JSON value
//! with no typed accessors. The only way to obtain a [`RegistryIndex`] or a
//! [`CountryDataset`] from one is [`Schema::validate`], which walks the value,
//! reports the first violated constraint with its location, and never coerces
//! malformed input into shape.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::model::ENGLISH;
use crate::{City, CountryCode, CountryDataset, CountrySummary, LocalizedName, Region, RegistryIndex};

/// First constraint a payload failed to satisfy.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{path}: {message}")]
pub struct ValidationError {
    /// Location of the offending value, e.g. `regions[0].cities[2].name.en`.
    pub path: String,
    /// Human-readable description of the violated constraint.
    pub message: String,
}

impl ValidationError {
    fn at(path: &FieldPath, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

/// Untyped payload awaiting validation.
///
/// # Examples
/// ```
/// use geoset_core::{Payload, RegistryIndex, Schema};
///
/// let payload = Payload::parse(br#"{"version": "1", "countries": {}}"#.to_vec())
///     .expect("well-formed JSON");
/// let index = RegistryIndex::validate(&payload).expect("valid index");
/// assert!(index.countries.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Payload(Value);

impl Payload {
    /// Decode raw bytes. Undecodable bytes are a validation failure at the root.
    pub fn parse(mut bytes: Vec<u8>) -> Result<Self, ValidationError> {
        simd_json::serde::from_slice::<Value>(&mut bytes)
            .map(Self)
            .map_err(|err| ValidationError {
                path: FieldPath::ROOT.to_owned(),
                message: format!("payload is not valid JSON: {err}"),
            })
    }

    /// Wrap an already decoded value.
    #[must_use]
    pub const fn from_value(value: Value) -> Self {
        Self(value)
    }
}

/// A shape contract that can be checked against a [`Payload`].
pub trait Schema: Sized {
    /// Validate `payload` and produce the typed value.
    fn validate(payload: &Payload) -> Result<Self, ValidationError>;
}

impl Schema for RegistryIndex {
    fn validate(payload: &Payload) -> Result<Self, ValidationError> {
        let root = FieldPath::root();
        let object = expect_object(&payload.0, &root)?;
        let version = required_string(object, &root, "version")?;
        let countries_path = root.field("countries");
        let entries = expect_object(required(object, &root, "countries")?, &countries_path)?;

        let mut countries = BTreeMap::new();
        for (key, value) in entries {
            let entry_path = countries_path.field(key);
            let lowercase = key.bytes().all(|byte| byte.is_ascii_lowercase());
            let code = CountryCode::parse(key)
                .ok()
                .filter(|_| lowercase)
                .ok_or_else(|| {
                    ValidationError::at(&entry_path, "key must be a lowercase two-letter code")
                })?;
            countries.insert(code, summary(value, &entry_path)?);
        }
        Ok(Self { version, countries })
    }
}

impl Schema for CountryDataset {
    fn validate(payload: &Payload) -> Result<Self, ValidationError> {
        let root = FieldPath::root();
        let object = expect_object(&payload.0, &root)?;
        let raw_code = required_string(object, &root, "code")?;
        let code = CountryCode::parse(&raw_code)
            .map_err(|err| ValidationError::at(&root.field("code"), err.to_string()))?;
        let iso3 = optional_string(object, &root, "iso3")?;
        let name = english_name(required(object, &root, "name")?, &root.field("name"))?;
        let phone = required_string(object, &root, "phone")?;
        let currency = required_string(object, &root, "currency")?;
        let timezone = required_string(object, &root, "timezone")?;
        let flag = required_string(object, &root, "flag")?;

        let regions_path = root.field("regions");
        let raw_regions = expect_array(required(object, &root, "regions")?, &regions_path)?;
        let mut seen = BTreeSet::new();
        let mut regions = Vec::with_capacity(raw_regions.len());
        for (position, value) in raw_regions.iter().enumerate() {
            let region_path = regions_path.item(position);
            let region = region(value, &region_path)?;
            if !seen.insert(region.code.clone()) {
                return Err(ValidationError::at(
                    &region_path.field("code"),
                    format!("duplicate region code {:?}", region.code),
                ));
            }
            regions.push(region);
        }

        Ok(Self {
            code,
            iso3,
            name,
            phone,
            currency,
            timezone,
            flag,
            regions,
        })
    }
}

fn summary(value: &Value, path: &FieldPath) -> Result<CountrySummary, ValidationError> {
    let object = expect_object(value, path)?;
    let name = english_name(required(object, path, "name")?, &path.field("name"))?;
    let flag = required_string(object, path, "flag")?;
    let languages_path = path.field("languages");
    let raw_languages = expect_array(required(object, path, "languages")?, &languages_path)?;
    let mut languages = Vec::with_capacity(raw_languages.len());
    for (position, entry) in raw_languages.iter().enumerate() {
        let lang = entry
            .as_str()
            .ok_or_else(|| ValidationError::at(&languages_path.item(position), "expected a string"))?;
        if languages.iter().any(|known: &String| known == lang) {
            return Err(ValidationError::at(
                &languages_path.item(position),
                format!("duplicate language {lang:?}"),
            ));
        }
        languages.push(lang.to_owned());
    }
    Ok(CountrySummary {
        name,
        flag,
        languages,
    })
}

fn region(value: &Value, path: &FieldPath) -> Result<Region, ValidationError> {
    let object = expect_object(value, path)?;
    let code = required_string(object, path, "code")?;
    if code.trim().is_empty() {
        return Err(ValidationError::at(&path.field("code"), "must not be empty"));
    }
    let name = localized(required(object, path, "name")?, &path.field("name"))?;
    let cities_path = path.field("cities");
    let raw_cities = expect_array(required(object, path, "cities")?, &cities_path)?;
    let cities = raw_cities
        .iter()
        .enumerate()
        .map(|(position, city_value)| city(city_value, &cities_path.item(position)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Region { code, name, cities })
}

fn city(value: &Value, path: &FieldPath) -> Result<City, ValidationError> {
    let object = expect_object(value, path)?;
    let name = english_name(required(object, path, "name")?, &path.field("name"))?;
    let latitude = coordinate(object, path, "latitude", 90.0)?;
    let longitude = coordinate(object, path, "longitude", 180.0)?;
    Ok(City {
        name,
        latitude,
        longitude,
    })
}

/// Presence is decided by key existence alone; `0` is a value like any other.
fn coordinate(
    object: &Map<String, Value>,
    path: &FieldPath,
    key: &str,
    bound: f64,
) -> Result<Option<f64>, ValidationError> {
    let Some(value) = object.get(key) else {
        return Ok(None);
    };
    let field = path.field(key);
    let number = value
        .as_f64()
        .filter(|number| number.is_finite())
        .ok_or_else(|| ValidationError::at(&field, "expected a finite number"))?;
    if !(-bound..=bound).contains(&number) {
        return Err(ValidationError::at(
            &field,
            format!("{number} is outside [-{bound}, {bound}]"),
        ));
    }
    Ok(Some(number))
}

fn english_name(value: &Value, path: &FieldPath) -> Result<LocalizedName, ValidationError> {
    let name = localized(value, path)?;
    match name.english() {
        Some(label) if !label.trim().is_empty() => Ok(name),
        Some(_) => Err(ValidationError::at(&path.field(ENGLISH), "must not be empty")),
        None => Err(ValidationError::at(
            &path.field(ENGLISH),
            "missing required English name",
        )),
    }
}

fn localized(value: &Value, path: &FieldPath) -> Result<LocalizedName, ValidationError> {
    let object = expect_object(value, path)?;
    let mut name = LocalizedName::default();
    for (lang, label) in object {
        let label = label
            .as_str()
            .ok_or_else(|| ValidationError::at(&path.field(lang), "expected a string"))?;
        name.insert(lang.clone(), label);
    }
    Ok(name)
}

fn required<'a>(
    object: &'a Map<String, Value>,
    path: &FieldPath,
    key: &str,
) -> Result<&'a Value, ValidationError> {
    object
        .get(key)
        .ok_or_else(|| ValidationError::at(&path.field(key), "missing required field"))
}

fn required_string(
    object: &Map<String, Value>,
    path: &FieldPath,
    key: &str,
) -> Result<String, ValidationError> {
    required(object, path, key)?
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| ValidationError::at(&path.field(key), "expected a string"))
}

fn optional_string(
    object: &Map<String, Value>,
    path: &FieldPath,
    key: &str,
) -> Result<Option<String>, ValidationError> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(_) => Err(ValidationError::at(&path.field(key), "expected a string")),
    }
}

fn expect_object<'a>(
    value: &'a Value,
    path: &FieldPath,
) -> Result<&'a Map<String, Value>, ValidationError> {
    value
        .as_object()
        .ok_or_else(|| ValidationError::at(path, "expected an object"))
}

fn expect_array<'a>(value: &'a Value, path: &FieldPath) -> Result<&'a Vec<Value>, ValidationError> {
    value
        .as_array()
        .ok_or_else(|| ValidationError::at(path, "expected an array"))
}

/// Dotted location used in validation messages.
#[derive(Debug, Clone)]
struct FieldPath(String);

impl FieldPath {
    const ROOT: &'static str = "$";

    fn root() -> Self {
        Self(Self::ROOT.to_owned())
    }

    fn field(&self, key: &str) -> Self {
        if self.0 == Self::ROOT {
            Self(key.to_owned())
        } else {
            Self(format!("{}.{key}", self.0))
        }
    }

    fn item(&self, position: usize) -> Self {
        Self(format!("{}[{position}]", self.0))
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
