//! Shared filesystem helpers built on `cap-std` and `camino`.
//!
//! Every write performed by geoset goes through [`write_atomic`], which stages
//! the bytes in a temporary file beside the target and renames it into place,
//! so readers never observe a partially written dataset, cache entry or
//! generated module.
#![forbid(unsafe_code)]

use std::io::{self, Read, Write};
use std::path::Component;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use tempfile::NamedTempFile;

/// Open a UTF-8 file path using ambient authority.
pub fn open_utf8_file(path: &Utf8Path) -> io::Result<fs_utf8::File> {
    fs_utf8::File::open_ambient(path, ambient_authority())
}

/// Read an entire file into memory.
pub fn read_bytes(path: &Utf8Path) -> io::Result<Vec<u8>> {
    let mut file = open_utf8_file(path)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// Open the directory at `path` using ambient authority.
pub fn open_dir(path: &Utf8Path) -> io::Result<fs_utf8::Dir> {
    fs_utf8::Dir::open_ambient_dir(path, ambient_authority())
}

/// Resolve an ambient directory for the given path and return the directory with the file name.
pub fn open_dir_and_file(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let parent = path.parent().unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::other("target should include a file name"))?
        .to_owned();
    let dir = open_dir(non_empty_or_current(parent))?;
    Ok((dir, file_name))
}

/// Create `dir` and any missing ancestors, handling absolute paths safely for cap-std.
pub fn ensure_dir(dir: &Utf8Path) -> io::Result<()> {
    if dir.as_str().is_empty() || dir == Utf8Path::new("/") {
        return Ok(());
    }
    let (base_dir, relative) = base_dir_and_relative(dir)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    base_dir.create_dir_all(&relative)
}

/// Ensure the parent directory for `path` exists.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) => ensure_dir(parent),
        None => Ok(()),
    }
}

/// Return whether a path exists and is a regular file using capability-based IO.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = open_dir_and_file(path)?;
    dir.metadata(name.as_str()).map(|meta| meta.is_file())
}

/// List the names of regular files directly inside `dir`.
///
/// The names come back sorted so callers see a stable order regardless of
/// how the underlying filesystem enumerates entries.
pub fn list_file_names(dir: &Utf8Path) -> io::Result<Vec<String>> {
    let handle = open_dir(dir)?;
    let mut names = Vec::new();
    for entry in handle.entries()? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            names.push(entry.file_name()?);
        }
    }
    names.sort();
    Ok(names)
}

/// List regular files directly inside `dir` with their sizes in bytes, sorted by name.
pub fn list_file_sizes(dir: &Utf8Path) -> io::Result<Vec<(String, u64)>> {
    let handle = open_dir(dir)?;
    let mut files = Vec::new();
    for entry in handle.entries()? {
        let entry = entry?;
        let meta = entry.metadata()?;
        if meta.is_file() {
            files.push((entry.file_name()?, meta.len()));
        }
    }
    files.sort();
    Ok(files)
}

/// Replace the contents of `path` with `bytes` in a single rename.
///
/// The parent directory is created when missing. The temporary file lives in
/// the same directory as the target so the final rename never crosses a
/// filesystem boundary.
pub fn write_atomic(path: &Utf8Path, bytes: &[u8]) -> io::Result<()> {
    ensure_parent_dir(path)?;
    let parent = non_empty_or_current(path.parent().unwrap_or_else(|| Utf8Path::new(".")));
    let mut staged = NamedTempFile::new_in(parent.as_std_path())?;
    staged.write_all(bytes)?;
    staged.as_file().sync_all()?;
    staged
        .persist(path.as_std_path())
        .map_err(|err| err.error)?;
    Ok(())
}

/// Remove `path`, returning `false` when it did not exist.
pub fn remove_file_if_exists(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = match open_dir_and_file(path) {
        Ok(found) => found,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(err),
    };
    match dir.remove_file(name.as_str()) {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err),
    }
}

/// Split an absolute or relative path into an ambient base directory and a relative suffix.
pub fn base_dir_and_relative(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let std_path = path.as_std_path();

    let (base, relative) = match std_path.components().next() {
        // Windows absolute path with a drive or UNC prefix.
        Some(Component::Prefix(prefix)) => {
            let prefix_str = prefix
                .as_os_str()
                .to_str()
                .ok_or_else(|| io::Error::other("non-UTF-8 path prefix"))?;
            let base = Utf8PathBuf::from(prefix_str).join(std::path::MAIN_SEPARATOR.to_string());
            let relative = std_path
                .strip_prefix(base.as_std_path())
                .or_else(|_| std_path.strip_prefix(prefix.as_os_str()))
                .map_err(|_| io::Error::other("failed to strip prefix from path"))?
                .to_path_buf();
            (base, relative)
        }
        Some(Component::RootDir) => {
            let base = Utf8PathBuf::from(std::path::MAIN_SEPARATOR.to_string());
            let relative = std_path
                .strip_prefix(base.as_std_path())
                .map_err(|_| io::Error::other("failed to strip root from absolute path"))?
                .to_path_buf();
            (base, relative)
        }
        _ => (Utf8PathBuf::from("."), std_path.to_path_buf()),
    };

    let dir = open_dir(&base)?;
    let relative =
        Utf8PathBuf::from_path_buf(relative).map_err(|_| io::Error::other("non-UTF-8 path"))?;
    Ok((dir, relative))
}

fn non_empty_or_current(path: &Utf8Path) -> &Utf8Path {
    if path.as_str().is_empty() {
        Utf8Path::new(".")
    } else {
        path
    }
}
