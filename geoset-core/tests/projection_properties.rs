//! Property-based tests for dataset projection.
//!
//! # Invariants tested
//!
//! - **Idempotence:** projecting a projection with the same config changes nothing.
//! - **English retention:** any name that carried `en` still carries it.
//! - **Zero coordinates:** with coordinates enabled, every present value survives bit for bit.
//! - **Purity:** the source dataset is unchanged by projection.

use proptest::prelude::*;
use geoset_core::{City, Config, CountryCode, CountryDataset, LocalizedName, Region, project};

const LANGUAGES: [&str; 5] = ["en", "ar", "fr", "de", "ja"];

fn name_strategy(require_english: bool) -> impl Strategy<Value = LocalizedName> {
    proptest::collection::btree_map(
        proptest::sample::select(LANGUAGES.to_vec()),
        "[a-z]{1,8}",
        0..=LANGUAGES.len(),
    )
    .prop_map(move |mut labels| {
        if require_english {
            labels.entry("en").or_insert_with(|| "english".to_owned());
        }
        LocalizedName::from_pairs(labels)
    })
}

fn coordinate_strategy(bound: f64) -> impl Strategy<Value = Option<f64>> {
    prop_oneof![Just(None), Just(Some(0.0)), (-bound..=bound).prop_map(Some)]
}

fn city_strategy() -> impl Strategy<Value = City> {
    (
        name_strategy(true),
        coordinate_strategy(90.0),
        coordinate_strategy(180.0),
    )
        .prop_map(|(name, latitude, longitude)| City {
            name,
            latitude,
            longitude,
        })
}

fn dataset_strategy() -> impl Strategy<Value = CountryDataset> {
    let regions = proptest::collection::vec(
        (name_strategy(false), proptest::collection::vec(city_strategy(), 0..4)),
        0..4,
    );
    (name_strategy(true), regions).prop_map(|(name, regions)| CountryDataset {
        code: CountryCode::parse("zz").unwrap_or_else(|err| panic!("fixed code: {err}")),
        iso3: None,
        name,
        phone: "+0".to_owned(),
        currency: "XXX".to_owned(),
        timezone: "UTC".to_owned(),
        flag: String::new(),
        regions: regions
            .into_iter()
            .enumerate()
            .map(|(position, (region_name, cities))| Region {
                code: format!("r{position}"),
                name: region_name,
                cities,
            })
            .collect(),
    })
}

fn config_strategy() -> impl Strategy<Value = Config> {
    (
        proptest::sample::subsequence(LANGUAGES.to_vec(), 1..=LANGUAGES.len()),
        any::<bool>(),
        any::<bool>(),
    )
        .prop_map(|(languages, coordinates, typescript)| {
            Config::new("out", languages, coordinates, typescript)
                .unwrap_or_else(|err| panic!("generated config should be valid: {err}"))
        })
}

fn all_names(dataset: &CountryDataset) -> Vec<&LocalizedName> {
    let mut names = vec![&dataset.name];
    for region in &dataset.regions {
        names.push(&region.name);
        names.extend(region.cities.iter().map(|city| &city.name));
    }
    names
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn projection_is_idempotent(dataset in dataset_strategy(), config in config_strategy()) {
        let once = project(&dataset, &config);
        let twice = project(&once, &config);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn english_is_always_retained(dataset in dataset_strategy(), config in config_strategy()) {
        let view = project(&dataset, &config);
        for (source, projected) in all_names(&dataset).into_iter().zip(all_names(&view)) {
            if let Some(english) = source.english() {
                prop_assert_eq!(projected.english(), Some(english));
            }
            for (lang, _) in projected.iter() {
                prop_assert!(lang == "en" || config.wants_language(lang));
            }
        }
    }

    #[test]
    fn present_coordinates_survive_when_requested(
        dataset in dataset_strategy(),
        languages in proptest::sample::subsequence(LANGUAGES.to_vec(), 1..=LANGUAGES.len()),
    ) {
        let config = Config::new("out", languages, true, false)
            .unwrap_or_else(|err| panic!("valid config: {err}"));
        let view = project(&dataset, &config);
        for (source, projected) in dataset.cities().zip(view.cities()) {
            prop_assert_eq!(
                source.latitude.map(f64::to_bits),
                projected.latitude.map(f64::to_bits)
            );
            prop_assert_eq!(
                source.longitude.map(f64::to_bits),
                projected.longitude.map(f64::to_bits)
            );
        }
    }

    #[test]
    fn coordinates_are_dropped_when_not_requested(dataset in dataset_strategy()) {
        let config = Config::new("out", ["en"], false, false)
            .unwrap_or_else(|err| panic!("valid config: {err}"));
        let view = project(&dataset, &config);
        prop_assert!(view.cities().all(|city| city.latitude.is_none() && city.longitude.is_none()));
    }

    #[test]
    fn source_is_not_mutated(dataset in dataset_strategy(), config in config_strategy()) {
        let snapshot = dataset.clone();
        let _view = project(&dataset, &config);
        prop_assert_eq!(dataset, snapshot);
    }
}
