//! Command-line interface for managing geoset datasets in a project.
//!
//! The binary is a thin dispatcher over the registry and code generation
//! crates: each subcommand loads the project configuration, runs one
//! operation to completion and prints plain status lines.
#![forbid(unsafe_code)]

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, Parser, Subcommand};
use geoset_core::{CONFIG_FILE_NAME, Config};
use geoset_registry::{
    CacheStore, Clock, RegistryEndpoint, RegistryLocation, RegistryService, RegistrySource,
    WarningSink,
};

mod commands;
mod error;
mod init;

pub use error::CliError;

use init::InitArgs;

const ARG_CONFIG: &str = "config";
const ARG_CACHE_DIR: &str = "cache-dir";
const ENV_CACHE_DIR: &str = "GEOSET_CACHE_DIR";
const ENV_XDG_CACHE_HOME: &str = "XDG_CACHE_HOME";
const ENV_HOME: &str = "HOME";
const CACHE_DIR_NAME: &str = "geoset";

/// Run the geoset CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let cache_dir = resolve_cache_dir(cli.cache_dir.clone(), |name| std::env::var(name).ok())?;
    let source = RegistryEndpoint::from_location(RegistryLocation::from_env()?)?;
    let service = RegistryService::new(source, CacheStore::new(cache_dir));
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    let mut stdout = std::io::stdout().lock();
    runtime.block_on(execute(cli, &service, &mut stdout))
}

/// Dispatch a parsed invocation against `service`, writing status lines to
/// `writer`.
pub(crate) async fn execute<S, C, W>(
    cli: Cli,
    service: &RegistryService<S, C, W>,
    writer: &mut dyn Write,
) -> Result<(), CliError>
where
    S: RegistrySource,
    C: Clock,
    W: WarningSink,
{
    let config_path = cli.config_path();
    match cli.command {
        Command::Init(args) => commands::init(args, &config_path, writer),
        Command::List(args) => {
            let config = load_project(&config_path)?;
            if args.available {
                commands::list_available(service, writer).await
            } else {
                commands::list_installed(&config, writer)
            }
        }
        Command::Add(args) => {
            let config = load_project(&config_path)?;
            commands::add(service, &config, &args.codes, writer).await
        }
        Command::Remove(args) => {
            let config = load_project(&config_path)?;
            commands::remove(&config, &args.codes, writer)
        }
        Command::Update => {
            let config = load_project(&config_path)?;
            commands::update(service, &config, writer).await
        }
        Command::Generate => {
            let config = load_project(&config_path)?;
            commands::generate(&config, writer)
        }
        Command::Cache(CacheCommand::Clear) => commands::cache_clear(service, writer),
        Command::Cache(CacheCommand::Stats) => commands::cache_stats(service, writer),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "geoset",
    about = "Install selected countries, regions and cities into a project",
    version
)]
pub(crate) struct Cli {
    /// Path to the project configuration file.
    #[arg(long = ARG_CONFIG, value_name = "path", global = true)]
    config: Option<Utf8PathBuf>,
    /// Directory holding cached registry responses.
    #[arg(long = ARG_CACHE_DIR, value_name = "dir", global = true)]
    cache_dir: Option<Utf8PathBuf>,
    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn config_path(&self) -> Utf8PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| Utf8PathBuf::from(CONFIG_FILE_NAME))
    }
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Write a project configuration file.
    Init(InitArgs),
    /// List installed countries, or those the registry offers.
    List(ListArgs),
    /// Install countries and regenerate the accessor module.
    Add(CodesArgs),
    /// Uninstall countries and regenerate the accessor module.
    Remove(CodesArgs),
    /// Re-fetch every installed country.
    Update,
    /// Regenerate the accessor module from installed datasets.
    Generate,
    /// Inspect or clear the registry cache.
    #[command(subcommand)]
    Cache(CacheCommand),
}

#[derive(Debug, Args)]
pub(crate) struct ListArgs {
    /// Show countries offered by the registry instead of installed ones.
    #[arg(long)]
    available: bool,
}

#[derive(Debug, Args)]
pub(crate) struct CodesArgs {
    /// ISO 3166-1 alpha-2 country codes.
    #[arg(value_name = "code", required = true)]
    codes: Vec<String>,
}

#[derive(Debug, Subcommand)]
pub(crate) enum CacheCommand {
    /// Delete every cached registry response.
    Clear,
    /// Report the number and total size of cached entries.
    Stats,
}

fn load_project(path: &Utf8Path) -> Result<Config, CliError> {
    match geoset_fs::file_is_file(path) {
        Ok(true) => Ok(Config::load(path)?),
        Ok(false) => Err(CliError::NotInitialised {
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::NotInitialised {
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectConfig {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Pick the cache root: the flag, then `GEOSET_CACHE_DIR`, then the XDG cache
/// home, then `~/.cache`.
fn resolve_cache_dir(
    flag: Option<Utf8PathBuf>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Utf8PathBuf, CliError> {
    if let Some(dir) = flag {
        return Ok(dir);
    }
    let non_empty = |name: &str| env(name).filter(|value| !value.trim().is_empty());
    if let Some(dir) = non_empty(ENV_CACHE_DIR) {
        return Ok(Utf8PathBuf::from(dir));
    }
    if let Some(xdg) = non_empty(ENV_XDG_CACHE_HOME) {
        return Ok(Utf8PathBuf::from(xdg).join(CACHE_DIR_NAME));
    }
    non_empty(ENV_HOME)
        .map(|home| Utf8PathBuf::from(home).join(".cache").join(CACHE_DIR_NAME))
        .ok_or(CliError::CacheDirUnavailable { env: ENV_CACHE_DIR })
}

#[cfg(test)]
mod tests;
