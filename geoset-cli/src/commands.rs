//! Subcommand handlers.
//!
//! Each handler performs one operation and writes one line per affected
//! country. Registry warnings are not printed here; they reach the log.

use std::io::Write;

use camino::Utf8Path;
use geoset_core::{Config, CountryCode, ENGLISH};
use geoset_registry::{
    Clock, InstallReport, Outcome, RegistryService, RegistrySource, Resolution, WarningSink,
};

use crate::CliError;
use crate::init::InitArgs;

pub(crate) fn init(
    args: InitArgs,
    config_path: &Utf8Path,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    config.save(config_path)?;
    writeln!(
        writer,
        "wrote {config_path} (output {}, languages {})",
        config.output_dir(),
        config
            .languages()
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(",")
    )?;
    Ok(())
}

pub(crate) fn list_installed(config: &Config, writer: &mut dyn Write) -> Result<(), CliError> {
    let codes = geoset_registry::installed_codes(config.output_dir())?;
    if codes.is_empty() {
        writeln!(writer, "no countries installed in {}", config.output_dir())?;
    }
    for code in codes {
        writeln!(writer, "{}", code.to_upper())?;
    }
    Ok(())
}

pub(crate) async fn list_available<S, C, W>(
    service: &RegistryService<S, C, W>,
    writer: &mut dyn Write,
) -> Result<(), CliError>
where
    S: RegistrySource,
    C: Clock,
    W: WarningSink,
{
    let index = match service.resolve_index().await? {
        Resolution::Valid(index) => index,
        Resolution::Invalid(source) => {
            return Err(CliError::InvalidPayload {
                subject: "the registry index".to_owned(),
                source,
            });
        }
    };
    for (code, summary) in &index.countries {
        let name = summary.name.resolve(ENGLISH).unwrap_or_default();
        writeln!(writer, "{} {} {name}", code.to_upper(), summary.flag)?;
    }
    Ok(())
}

/// Install `codes` in order, stopping at the first failure.
///
/// The accessor module is regenerated whenever at least one country was
/// installed, so it always matches the files on disk.
pub(crate) async fn add<S, C, W>(
    service: &RegistryService<S, C, W>,
    config: &Config,
    codes: &[String],
    writer: &mut dyn Write,
) -> Result<(), CliError>
where
    S: RegistrySource,
    C: Clock,
    W: WarningSink,
{
    let codes = parse_codes(codes)?;
    let mut installed = 0_usize;
    let mut failure = None;
    for code in &codes {
        match geoset_registry::install(service, code, config).await {
            Ok(Outcome::Done(report)) => {
                write_report(writer, "added", &report)?;
                installed += 1;
            }
            Ok(Outcome::NotFound(missing)) => {
                failure = Some(CliError::NotFound {
                    code: missing.to_upper(),
                });
                break;
            }
            Ok(Outcome::Invalid(source)) => {
                failure = Some(CliError::InvalidPayload {
                    subject: code.to_upper(),
                    source,
                });
                break;
            }
            Err(err) => {
                failure = Some(err.into());
                break;
            }
        }
    }
    if installed > 0 {
        generate(config, writer)?;
    }
    failure.map_or(Ok(()), Err)
}

pub(crate) fn remove(
    config: &Config,
    codes: &[String],
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let codes = parse_codes(codes)?;
    for code in &codes {
        if geoset_registry::remove(code, config)? {
            writeln!(writer, "removed {}", code.to_upper())?;
        } else {
            writeln!(writer, "{} was not installed", code.to_upper())?;
        }
    }
    generate(config, writer)
}

pub(crate) async fn update<S, C, W>(
    service: &RegistryService<S, C, W>,
    config: &Config,
    writer: &mut dyn Write,
) -> Result<(), CliError>
where
    S: RegistrySource,
    C: Clock,
    W: WarningSink,
{
    let outcomes = geoset_registry::refresh(service, config).await?;
    if outcomes.is_empty() {
        writeln!(writer, "nothing to update")?;
        return Ok(());
    }
    for (code, outcome) in &outcomes {
        match outcome {
            Outcome::Done(report) => write_report(writer, "updated", report)?,
            Outcome::NotFound(_) => {
                writeln!(writer, "{} is no longer in the registry", code.to_upper())?;
            }
            Outcome::Invalid(error) => {
                writeln!(writer, "{} kept as is: {error}", code.to_upper())?;
            }
        }
    }
    generate(config, writer)
}

pub(crate) fn generate(config: &Config, writer: &mut dyn Write) -> Result<(), CliError> {
    let module = geoset_codegen::generate(config)?;
    writeln!(
        writer,
        "generated {} ({} countries)",
        module.path,
        module.codes.len()
    )?;
    Ok(())
}

pub(crate) fn cache_clear<S, C, W>(
    service: &RegistryService<S, C, W>,
    writer: &mut dyn Write,
) -> Result<(), CliError>
where
    S: RegistrySource,
    C: Clock,
    W: WarningSink,
{
    service.clear_cache()?;
    writeln!(writer, "cleared cache at {}", service.cache().root())?;
    Ok(())
}

pub(crate) fn cache_stats<S, C, W>(
    service: &RegistryService<S, C, W>,
    writer: &mut dyn Write,
) -> Result<(), CliError>
where
    S: RegistrySource,
    C: Clock,
    W: WarningSink,
{
    match service.cache_stats() {
        Some(stats) => writeln!(
            writer,
            "{} entries, {} bytes in {}",
            stats.entry_count,
            stats.total_bytes,
            service.cache().root()
        )?,
        None => writeln!(writer, "cache at {} is empty", service.cache().root())?,
    }
    Ok(())
}

fn parse_codes(raw: &[String]) -> Result<Vec<CountryCode>, CliError> {
    raw.iter()
        .map(|code| CountryCode::parse(code).map_err(CliError::from))
        .collect()
}

fn write_report(
    writer: &mut dyn Write,
    verb: &str,
    report: &InstallReport,
) -> Result<(), CliError> {
    let name = report.summary.name.resolve(ENGLISH).unwrap_or_default();
    writeln!(
        writer,
        "{verb} {} {name} ({} regions, {} cities)",
        report.code.to_upper(),
        report.regions,
        report.cities
    )?;
    Ok(())
}
