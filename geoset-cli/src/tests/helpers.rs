//! Test helpers running CLI invocations against an in-memory registry.

use super::*;
use geoset_core::test_support::{minimal_dataset_json, sample_dataset_json, sample_index_json};
use geoset_registry::test_support::{
    ManualClock, RecordingWarnings, StubSource, block_on_for_tests,
};
use tempfile::TempDir;

pub(super) type TestService = RegistryService<StubSource, ManualClock, RecordingWarnings>;

/// A project directory, cache directory and stub registry for one test.
pub(super) struct Workspace {
    _dir: TempDir,
    pub(super) root: Utf8PathBuf,
    pub(super) clock: ManualClock,
    pub(super) service: TestService,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 tempdir");
        let source = StubSource::remote();
        source.respond_json("index.json", &sample_index_json());
        source.respond_json("sa.json", &sample_dataset_json());
        source.respond_json("us.json", &minimal_dataset_json("us", "United States"));
        let clock = ManualClock::at(1_700_000_000);
        let cache = CacheStore::with_clock(root.join("cache"), clock.clone());
        let service =
            RegistryService::new(source, cache).with_warnings(RecordingWarnings::default());
        Self {
            _dir: dir,
            root,
            clock,
            service,
        }
    }

    pub(super) fn config_path(&self) -> Utf8PathBuf {
        self.root.join(CONFIG_FILE_NAME)
    }

    pub(super) fn output_dir(&self) -> Utf8PathBuf {
        self.root.join("data")
    }

    /// Write a configuration selecting Arabic and TypeScript output.
    pub(super) fn initialise(&self) {
        let output_dir = self.output_dir();
        let (result, _) = self.run(&["init", "--output-dir", output_dir.as_str(), "--languages", "ar"]);
        result.expect("init should succeed");
    }

    /// Run `geoset --config <project config> <args>` and capture stdout.
    pub(super) fn run(&self, args: &[&str]) -> (Result<(), CliError>, String) {
        let mut argv = vec![
            "geoset".to_owned(),
            format!("--{ARG_CONFIG}"),
            self.config_path().into_string(),
        ];
        argv.extend(args.iter().map(|arg| (*arg).to_owned()));
        let mut stdout = Vec::new();
        let result = Cli::try_parse_from(argv)
            .map_err(CliError::from)
            .and_then(|cli| block_on_for_tests(execute(cli, &self.service, &mut stdout)));
        let output = String::from_utf8(stdout).expect("stdout utf-8");
        (result, output)
    }
}
