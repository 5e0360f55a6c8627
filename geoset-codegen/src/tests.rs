//! Unit coverage for module rendering and generation.
#![expect(clippy::expect_used, reason = "tests should fail fast when setup breaks")]

use camino::{Utf8Path, Utf8PathBuf};
use geoset_core::{Config, CountryCode};
use rstest::{fixture, rstest};
use tempfile::TempDir;

use crate::render::{HELPERS, specialise};
use crate::{CodegenError, OutputMode, generate, render};

const EXPORTS: [&str; 8] = [
    "export const countries",
    "export function isValidCountryCode(",
    "export function getCountry(",
    "export function getRegions(",
    "export function getCities(",
    "export function getAllCities(",
    "export function getLocalizedName(",
    "export function getCountryCodes(",
];

fn codes(raw: &[&str]) -> Vec<CountryCode> {
    raw.iter()
        .map(|code| CountryCode::parse(code).expect("valid code"))
        .collect()
}

struct Project {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Project {
    fn config(&self, typescript: bool) -> Config {
        Config::new(self.root.clone(), ["en"], false, typescript).expect("valid config")
    }

    fn touch(&self, name: &str) {
        geoset_fs::write_atomic(&self.root.join(name), b"{}").expect("write fixture file");
    }
}

#[fixture]
fn project() -> Project {
    let dir = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(dir.path().join("data")).expect("utf-8 tempdir");
    Project { _dir: dir, root }
}

#[rstest]
fn typescript_module_lists_sorted_codes() {
    let module = render(&codes(&["us", "sa"]), OutputMode::TypeScript);
    assert!(module.contains(concat!(
        "import data_sa from \"./sa.json\" with { type: \"json\" };\n",
        "import data_us from \"./us.json\" with { type: \"json\" };\n",
    )));
    assert!(module.contains("export type CountryCode = \"SA\" | \"US\";"));
    assert!(module.contains("  SA: data_sa as Country,\n  US: data_us as Country,\n"));
    assert!(module.contains("const codes: readonly CountryCode[] = [\"SA\", \"US\"];"));
    assert!(module.contains(
        "export function isValidCountryCode(code: unknown): code is CountryCode {"
    ));
}

#[rstest]
fn javascript_module_has_no_type_syntax() {
    let module = render(&codes(&["sa"]), OutputMode::JavaScript);
    assert!(module.contains("import data_sa from \"./sa.json\" with { type: \"json\" };"));
    assert!(module.contains("export const countries = {\n  SA: data_sa,\n};"));
    assert!(module.contains("const codes = [\"SA\"];"));
    assert!(module.contains("export function getCities(code, regionCode) {"));
    for fragment in ["«", "»", "interface", "CountryCode[]", " as ", "): "] {
        assert!(
            !module.contains(fragment),
            "unexpected {fragment:?} in JavaScript"
        );
    }
}

#[rstest]
#[case(OutputMode::TypeScript)]
#[case(OutputMode::JavaScript)]
fn both_variants_export_every_helper(#[case] mode: OutputMode) {
    let module = render(&codes(&["qa"]), mode);
    for export in EXPORTS {
        assert!(module.contains(export), "{mode:?} module lacks {export}");
    }
}

#[rstest]
fn variants_share_their_statements() {
    let statements = |source: &str| -> Vec<String> {
        source
            .lines()
            .map(str::trim)
            .filter(|line| line.starts_with("return") || line.starts_with("if ("))
            .map(|line| line.replace(" as CountryCode", ""))
            .collect()
    };
    let ts = specialise(HELPERS, OutputMode::TypeScript);
    let js = specialise(HELPERS, OutputMode::JavaScript);
    assert_eq!(statements(&ts), statements(&js));
}

#[rstest]
#[case(
    OutputMode::TypeScript,
    "export const countries: Record<CountryCode, Country> = {};"
)]
#[case(OutputMode::JavaScript, "export const countries = {};")]
fn empty_module_is_still_complete(#[case] mode: OutputMode, #[case] table: &str) {
    let module = render(&[], mode);
    assert!(module.contains(table));
    assert!(!module.contains("import "));
    for export in EXPORTS {
        assert!(module.contains(export));
    }
    assert_eq!(
        module.contains("export type CountryCode = never;"),
        mode == OutputMode::TypeScript
    );
}

#[rstest]
fn empty_typescript_module_never_indexes_by_the_empty_union() {
    let module = render(&[], OutputMode::TypeScript);
    assert!(module.contains("const codes: readonly CountryCode[] = [];"));
    assert!(!module.contains("countries[code]"));
    assert!(module.contains("return codes.flatMap((code) => getCities(code));"));
}

#[rstest]
#[case(OutputMode::TypeScript)]
#[case(OutputMode::JavaScript)]
fn both_variants_import_json_with_attributes(#[case] mode: OutputMode) {
    let module = render(&codes(&["qa"]), mode);
    assert!(module.contains("import data_qa from \"./qa.json\" with { type: \"json\" };\n"));
}

#[rstest]
fn output_ignores_input_order_and_duplicates() {
    let forward = render(&codes(&["sa", "qa", "us"]), OutputMode::TypeScript);
    let shuffled = render(&codes(&["us", "SA", "qa", "sa"]), OutputMode::TypeScript);
    assert_eq!(forward, shuffled);
}

#[rstest]
fn reserved_word_codes_get_safe_bindings() {
    let module = render(&codes(&["do", "in"]), OutputMode::JavaScript);
    assert!(module.contains("import data_do from \"./do.json\""));
    assert!(module.contains("  IN: data_in,"));
}

#[rstest]
fn localized_name_falls_back_to_english_then_first_key() {
    let helpers = specialise(HELPERS, OutputMode::JavaScript);
    let lang = helpers
        .find("if (has(name, lang))")
        .expect("requested language first");
    let english = helpers
        .find("if (has(name, \"en\"))")
        .expect("English second");
    let first = helpers
        .find("Object.keys(name)[0]")
        .expect("first key last");
    assert!(lang < english && english < first);
}

#[rstest]
#[case(true, "countries.ts")]
#[case(false, "countries.js")]
fn generate_writes_module_named_for_mode(
    project: Project,
    #[case] typescript: bool,
    #[case] file_name: &str,
) {
    project.touch("us.json");
    project.touch("sa.json");
    let module = generate(&project.config(typescript)).expect("generate module");
    assert_eq!(module.path, project.root.join(file_name));
    assert_eq!(module.codes, codes(&["sa", "us"]));
    let written = std::fs::read_to_string(module.path.as_std_path()).expect("module written");
    assert_eq!(written, render(&module.codes, module.mode));
}

#[rstest]
fn generate_skips_index_and_foreign_files(project: Project) {
    for name in ["index.json", "qa.json", "notes.txt", "usa.json", "countries.ts"] {
        project.touch(name);
    }
    let module = generate(&project.config(true)).expect("generate module");
    assert_eq!(module.codes, codes(&["qa"]));
}

#[rstest]
fn generate_into_missing_directory_is_empty(project: Project) {
    let module = generate(&project.config(false)).expect("generate module");
    assert!(module.codes.is_empty());
    assert!(module.path.exists());
}

#[rstest]
fn unreadable_output_directory_is_reported(project: Project) {
    // A file where the directory should be.
    let parent = project.root.parent().unwrap_or_else(|| Utf8Path::new("."));
    geoset_fs::write_atomic(&parent.join("blocked"), b"").expect("write blocker");
    let config = Config::new(parent.join("blocked"), ["en"], false, true).expect("valid config");
    let err = generate(&config).expect_err("listing a file should fail");
    assert!(matches!(err, CodegenError::ListDatasets { .. }), "got {err:?}");
}
