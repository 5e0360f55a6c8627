//! Language and coordinate projection of validated datasets.

use crate::model::ENGLISH;
use crate::{City, Config, CountryDataset, LocalizedName, Region};

/// Project `dataset` down to the languages and coordinates `config` selects.
///
/// Every name map keeps only the selected languages, plus English whenever the
/// source carries it, so each entity stays displayable. Coordinates are kept
/// or dropped wholesale; when kept, a field survives exactly when it was
/// present, so a latitude or longitude of `0` is preserved. All other fields
/// are copied unchanged. The input is never modified and the projection is
/// idempotent.
///
/// # Examples
/// ```
/// use geoset_core::{Config, CountryDataset, Payload, Schema, project};
/// use serde_json::json;
///
/// let payload = Payload::from_value(json!({
///     "code": "sa", "name": {"en": "Saudi Arabia"}, "phone": "+966",
///     "currency": "SAR", "timezone": "Asia/Riyadh", "flag": "🇸🇦",
///     "regions": [{"code": "01", "name": {"en": "Riyadh Region"}, "cities": [
///         {"name": {"en": "Riyadh", "ar": "الرياض", "fr": "Riyad"}, "latitude": 24.7136}
///     ]}]
/// }));
/// let dataset = CountryDataset::validate(&payload).expect("valid dataset");
/// let config = Config::new("out", ["ar"], false, true).expect("valid config");
/// let view = project(&dataset, &config);
/// let riyadh = &view.regions[0].cities[0];
/// assert_eq!(riyadh.name.get("fr"), None);
/// assert_eq!(riyadh.name.get("en"), Some("Riyadh"));
/// assert_eq!(riyadh.latitude, None);
/// ```
#[must_use]
pub fn project(dataset: &CountryDataset, config: &Config) -> CountryDataset {
    CountryDataset {
        code: dataset.code.clone(),
        iso3: dataset.iso3.clone(),
        name: project_name(&dataset.name, config),
        phone: dataset.phone.clone(),
        currency: dataset.currency.clone(),
        timezone: dataset.timezone.clone(),
        flag: dataset.flag.clone(),
        regions: dataset
            .regions
            .iter()
            .map(|region| project_region(region, config))
            .collect(),
    }
}

fn project_region(region: &Region, config: &Config) -> Region {
    Region {
        code: region.code.clone(),
        name: project_name(&region.name, config),
        cities: region
            .cities
            .iter()
            .map(|city| project_city(city, config))
            .collect(),
    }
}

fn project_city(city: &City, config: &Config) -> City {
    let keep = config.include_coordinates();
    City {
        name: project_name(&city.name, config),
        latitude: city.latitude.filter(|_| keep),
        longitude: city.longitude.filter(|_| keep),
    }
}

fn project_name(name: &LocalizedName, config: &Config) -> LocalizedName {
    let mut projected = LocalizedName::from_pairs(
        name.iter()
            .filter(|(lang, _)| config.wants_language(lang)),
    );
    if let Some(english) = name.english() {
        projected.insert(ENGLISH, english);
    }
    projected
}
