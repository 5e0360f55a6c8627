//! Materialising resolved datasets into a project's output directory.
//!
//! Each installed country becomes `<code>.json` beside an `index.json` that
//! lists the installed subset of the registry index. Files are written with
//! stable key order and replaced atomically.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use geoset_core::{
    Config, CountryCode, CountrySummary, INDEX_FILE_NAME, Payload, RegistryIndex, Schema,
    ValidationError,
};
use serde::Serialize;

use crate::{Clock, InstallError, RegistrySource, Resolution, RegistryService, WarningSink};

/// Result of a command that may not find or accept its subject.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The operation completed.
    Done(T),
    /// The code is not listed in the registry index.
    NotFound(CountryCode),
    /// The registry answered with a payload that failed validation.
    Invalid(ValidationError),
}

/// What [`install`] wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct InstallReport {
    /// Installed country.
    pub code: CountryCode,
    /// Index summary of the country.
    pub summary: CountrySummary,
    /// Dataset file written.
    pub path: Utf8PathBuf,
    /// Number of regions written.
    pub regions: usize,
    /// Number of cities written.
    pub cities: usize,
}

/// Resolve `code` and write its projected dataset into `config.output_dir()`.
pub async fn install<S, C, W>(
    service: &RegistryService<S, C, W>,
    code: &CountryCode,
    config: &Config,
) -> Result<Outcome<InstallReport>, InstallError>
where
    S: RegistrySource,
    C: Clock,
    W: WarningSink,
{
    let index = match service.resolve_index().await? {
        Resolution::Valid(index) => index,
        Resolution::Invalid(error) => return Ok(Outcome::Invalid(error)),
    };
    let Some(summary) = index.get(code).cloned() else {
        return Ok(Outcome::NotFound(code.clone()));
    };
    let dataset = match service.resolve_dataset(code, config).await? {
        Resolution::Valid(dataset) => dataset,
        Resolution::Invalid(error) => return Ok(Outcome::Invalid(error)),
    };

    let output_dir = config.output_dir();
    let path = output_dir.join(code.file_name());
    write_json(&path, &dataset)?;

    let mut local = read_local_index(output_dir)?.unwrap_or_default();
    local.version.clone_from(&index.version);
    local.countries.insert(code.clone(), summary.clone());
    write_json(&output_dir.join(INDEX_FILE_NAME), &local)?;

    log::info!("installed {code} into {path}");
    Ok(Outcome::Done(InstallReport {
        code: code.clone(),
        summary,
        path,
        regions: dataset.regions.len(),
        cities: dataset.cities().count(),
    }))
}

/// Delete `code`'s dataset file and index entry.
///
/// Returns whether anything was removed.
pub fn remove(code: &CountryCode, config: &Config) -> Result<bool, InstallError> {
    let output_dir = config.output_dir();
    let path = output_dir.join(code.file_name());
    let removed_file =
        geoset_fs::remove_file_if_exists(&path).map_err(|source| InstallError::Io { path, source })?;

    let mut removed_entry = false;
    if let Some(mut local) = read_local_index(output_dir)? {
        removed_entry = local.countries.remove(code).is_some();
        if removed_entry {
            write_json(&output_dir.join(INDEX_FILE_NAME), &local)?;
        }
    }
    if removed_file || removed_entry {
        log::info!("removed {code} from {output_dir}");
    }
    Ok(removed_file || removed_entry)
}

/// Codes currently installed in `output_dir`, sorted.
pub fn installed_codes(output_dir: &Utf8Path) -> Result<Vec<CountryCode>, InstallError> {
    geoset_core::installed_codes(output_dir).map_err(|source| InstallError::Io {
        path: output_dir.to_owned(),
        source,
    })
}

/// Re-install every installed code, fetching each dataset in full.
///
/// Outcomes are reported per code in sorted order. Registry failures stop the
/// refresh at the failing code.
pub async fn refresh<S, C, W>(
    service: &RegistryService<S, C, W>,
    config: &Config,
) -> Result<Vec<(CountryCode, Outcome<InstallReport>)>, InstallError>
where
    S: RegistrySource,
    C: Clock,
    W: WarningSink,
{
    let mut outcomes = Vec::new();
    for code in installed_codes(config.output_dir())? {
        let outcome = install(service, &code, config).await?;
        outcomes.push((code, outcome));
    }
    Ok(outcomes)
}

/// The summary index materialised in `output_dir`, if one exists.
pub fn read_local_index(output_dir: &Utf8Path) -> Result<Option<RegistryIndex>, InstallError> {
    let path = output_dir.join(INDEX_FILE_NAME);
    let bytes = match geoset_fs::read_bytes(&path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => return Err(InstallError::Io { path, source }),
    };
    Payload::parse(bytes)
        .and_then(|payload| RegistryIndex::validate(&payload))
        .map(Some)
        .map_err(|source| InstallError::LocalIndex { path, source })
}

fn write_json<T: Serialize>(path: &Utf8Path, value: &T) -> Result<(), InstallError> {
    let mut bytes = serde_json::to_vec_pretty(value).map_err(|source| InstallError::Encode {
        path: path.to_owned(),
        source,
    })?;
    bytes.push(b'\n');
    geoset_fs::write_atomic(path, &bytes).map_err(|source| InstallError::Io {
        path: path.to_owned(),
        source,
    })
}
