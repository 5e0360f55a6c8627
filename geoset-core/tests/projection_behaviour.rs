//! Behavioural tests for dataset projection.

use geoset_core::{City, Config, CountryDataset, LocalizedName, Payload, Schema, project};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::{Value, json};
use std::cell::RefCell;

type DatasetCell = RefCell<Option<CountryDataset>>;

#[fixture]
fn dataset() -> DatasetCell {
    RefCell::new(None)
}

#[fixture]
fn view() -> DatasetCell {
    RefCell::new(None)
}

fn dataset_with_city(city: Value) -> CountryDataset {
    let payload = Payload::from_value(json!({
        "code": "sa",
        "name": { "en": "Saudi Arabia" },
        "phone": "+966",
        "currency": "SAR",
        "timezone": "Asia/Riyadh",
        "flag": "🇸🇦",
        "regions": [{ "code": "01", "name": { "en": "Riyadh Region" }, "cities": [city] }]
    }));
    CountryDataset::validate(&payload).expect("fixture dataset should validate")
}

fn projected_city(view: &DatasetCell) -> City {
    view.borrow()
        .as_ref()
        .and_then(|dataset| dataset.cities().next().cloned())
        .expect("projection should contain a city")
}

fn project_into(dataset: &DatasetCell, view: &DatasetCell, config: &Config) {
    let source = dataset.borrow();
    let source = source.as_ref().expect("dataset must be initialised");
    *view.borrow_mut() = Some(project(source, config));
}

// --- Given steps ---

#[given("a dataset whose city Riyadh has English, Arabic and French names and a latitude")]
fn riyadh_dataset(#[from(dataset)] dataset: &DatasetCell) {
    *dataset.borrow_mut() = Some(dataset_with_city(json!({
        "name": { "en": "Riyadh", "ar": "الرياض", "fr": "Riyad" },
        "latitude": 24.7136
    })));
}

#[given("a dataset whose city lies on the equator")]
fn equator_dataset(#[from(dataset)] dataset: &DatasetCell) {
    *dataset.borrow_mut() = Some(dataset_with_city(json!({
        "name": { "en": "Null Island" },
        "latitude": 0,
        "longitude": 0
    })));
}

// --- When steps ---

#[when("I project it for Arabic without coordinates")]
fn project_arabic(#[from(dataset)] dataset: &DatasetCell, #[from(view)] view: &DatasetCell) {
    let config = Config::new("out", ["ar"], false, false).expect("valid config");
    project_into(dataset, view, &config);
}

#[when("I project it for English with coordinates")]
fn project_english(#[from(dataset)] dataset: &DatasetCell, #[from(view)] view: &DatasetCell) {
    let config = Config::new("out", ["en"], true, false).expect("valid config");
    project_into(dataset, view, &config);
}

// --- Then steps ---

#[then("the city keeps only its English and Arabic names")]
fn english_and_arabic(#[from(view)] view: &DatasetCell) {
    let city = projected_city(view);
    assert_eq!(
        city.name,
        LocalizedName::from_pairs([("en", "Riyadh"), ("ar", "الرياض")])
    );
}

#[then("the city has no latitude")]
fn no_latitude(#[from(view)] view: &DatasetCell) {
    let city = projected_city(view);
    assert_eq!(city.latitude, None);
    let json = serde_json::to_value(&city).expect("serialise city");
    assert!(json.get("latitude").is_none(), "latitude must not be serialised");
}

#[then("the city keeps a latitude of exactly zero")]
fn zero_latitude(#[from(view)] view: &DatasetCell) {
    let city = projected_city(view);
    assert_eq!(city.latitude, Some(0.0));
    assert_eq!(city.longitude, Some(0.0));
}

// --- Scenario registrations ---

#[scenario(path = "tests/features/projection.feature", index = 0)]
fn keeping_arabic_names(dataset: DatasetCell, view: DatasetCell) {
    let _ = (dataset, view);
}

#[scenario(path = "tests/features/projection.feature", index = 1)]
fn preserving_equator_city(dataset: DatasetCell, view: DatasetCell) {
    let _ = (dataset, view);
}
