//! `init` command arguments and their layered resolution.

use camino::Utf8PathBuf;
use clap::Parser;
use geoset_core::Config;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::CliError;

pub(crate) const ARG_OUTPUT_DIR: &str = "output-dir";
pub(crate) const ARG_LANGUAGES: &str = "languages";
pub(crate) const ARG_COORDINATES: &str = "coordinates";
pub(crate) const ARG_TYPESCRIPT: &str = "typescript";

pub(crate) const DEFAULT_OUTPUT_DIR: &str = "src/data";
pub(crate) const DEFAULT_LANGUAGES: &str = "en";

/// CLI arguments for the `init` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Create the project configuration. Options can come from \
                 CLI flags, configuration files, or GEOSET_* environment \
                 variables; anything left unset takes its default.",
    about = "Write a project configuration file"
)]
#[ortho_config(prefix = "GEOSET")]
pub(crate) struct InitArgs {
    /// Directory datasets and the accessor module are written to.
    #[arg(long = ARG_OUTPUT_DIR, value_name = "dir")]
    #[serde(default)]
    pub(crate) output_dir: Option<Utf8PathBuf>,
    /// Comma-separated language tags to keep, e.g. "en,ar".
    #[arg(long = ARG_LANGUAGES, value_name = "tags")]
    #[serde(default)]
    pub(crate) languages: Option<String>,
    /// Keep city coordinates.
    #[arg(
        long = ARG_COORDINATES,
        value_name = "bool",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    #[serde(default)]
    pub(crate) coordinates: Option<bool>,
    /// Emit a TypeScript module instead of JavaScript.
    #[arg(
        long = ARG_TYPESCRIPT,
        value_name = "bool",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    #[serde(default)]
    pub(crate) typescript: Option<bool>,
}

impl InitArgs {
    pub(crate) fn into_config(self) -> Result<Config, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        Config::try_from(merged)
    }
}

impl TryFrom<InitArgs> for Config {
    type Error = CliError;

    fn try_from(args: InitArgs) -> Result<Self, Self::Error> {
        let output_dir = args
            .output_dir
            .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_OUTPUT_DIR));
        let languages = args
            .languages
            .unwrap_or_else(|| DEFAULT_LANGUAGES.to_owned());
        let config = Self::new(
            output_dir,
            languages.split(',').map(str::trim),
            args.coordinates.unwrap_or(false),
            args.typescript.unwrap_or(true),
        )?;
        Ok(config)
    }
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<Config, CliError> {
    let merged = InitArgs::merge_from_layers(layers).map_err(CliError::from)?;
    Config::try_from(merged)
}
