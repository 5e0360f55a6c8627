#![expect(
    clippy::expect_used,
    reason = "tests should fail fast when setup breaks"
)]

//! Behavioural coverage for accessor module generation.

use std::cell::RefCell;

use camino::Utf8PathBuf;
use geoset_codegen::{GeneratedModule, generate};
use geoset_core::Config;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use tempfile::TempDir;

/// Shared state for the generation scenarios.
pub struct GenerateContext {
    temp_dir: TempDir,
    output_dir: RefCell<Option<Utf8PathBuf>>,
    module: RefCell<Option<GeneratedModule>>,
}

impl GenerateContext {
    fn output_dir(&self) -> Utf8PathBuf {
        self.output_dir
            .borrow()
            .clone()
            .expect("output directory should be prepared")
    }

    fn generate(&self, typescript: bool) {
        let config =
            Config::new(self.output_dir(), ["en"], false, typescript).expect("valid config");
        let module = generate(&config).expect("generation should succeed");
        self.module.replace(Some(module));
    }

    fn contents(&self) -> String {
        let borrowed = self.module.borrow();
        let module = borrowed.as_ref().expect("a module should be generated");
        std::fs::read_to_string(module.path.as_std_path()).expect("read generated module")
    }
}

#[fixture]
/// Build a fresh context backed by its own temporary directory.
pub fn generate_context() -> GenerateContext {
    GenerateContext {
        temp_dir: TempDir::new().expect("create tempdir for scenario"),
        output_dir: RefCell::new(None),
        module: RefCell::new(None),
    }
}

#[given("an output directory")]
fn output_directory(#[from(generate_context)] ctx: &GenerateContext) {
    let dir = Utf8PathBuf::from_path_buf(ctx.temp_dir.path().join("data"))
        .expect("utf-8 tempdir");
    ctx.output_dir.replace(Some(dir));
}

#[given("the dataset {code:word} is installed")]
fn dataset_installed(#[from(generate_context)] ctx: &GenerateContext, code: String) {
    let mut file_name = code;
    file_name.push_str(".json");
    let path = ctx.output_dir().join(file_name);
    geoset_fs::write_atomic(&path, b"{}").expect("write dataset file");
}

#[given("the summary index is present")]
fn summary_index(#[from(generate_context)] ctx: &GenerateContext) {
    let path = ctx.output_dir().join(geoset_core::INDEX_FILE_NAME);
    geoset_fs::write_atomic(&path, br#"{"version": "1", "countries": {}}"#)
        .expect("write index file");
}

#[when("I generate a TypeScript module")]
fn generate_typescript(#[from(generate_context)] ctx: &GenerateContext) {
    ctx.generate(true);
}

#[when("I generate a JavaScript module")]
fn generate_javascript(#[from(generate_context)] ctx: &GenerateContext) {
    ctx.generate(false);
}

#[then("the module is written to {name:word}")]
fn module_written_to(#[from(generate_context)] ctx: &GenerateContext, name: String) {
    let borrowed = ctx.module.borrow();
    let module = borrowed.as_ref().expect("a module should be generated");
    assert_eq!(module.path, ctx.output_dir().join(name));
}

#[then("the module lists the codes \"SA\" | \"US\"")]
fn module_lists_codes(#[from(generate_context)] ctx: &GenerateContext) {
    let contents = ctx.contents();
    assert!(contents.contains("export type CountryCode = \"SA\" | \"US\";"));
    assert!(contents.contains("= [\"SA\", \"US\"];"));
    assert!(!contents.contains("data_index"));
}

#[then("the module exports an empty country table")]
fn empty_country_table(#[from(generate_context)] ctx: &GenerateContext) {
    let contents = ctx.contents();
    assert!(contents.contains("export const countries = {};"));
    assert!(contents.contains("const codes = [];"));
    assert!(contents.contains("export function getAllCities()"));
}

#[scenario(path = "tests/features/generate_module.feature", index = 0)]
fn listing_installed_countries(#[from(generate_context)] context: GenerateContext) {
    let _ = context;
}

#[scenario(path = "tests/features/generate_module.feature", index = 1)]
fn generating_before_install(#[from(generate_context)] context: GenerateContext) {
    let _ = context;
}
