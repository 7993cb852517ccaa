//! Blocking file primitives
//!
//! Every function here attempts the operation and classifies the OS error
//! instead of checking for existence first. [`FileHandler`](crate::FileHandler)
//! runs these on the blocking pool for async callers.

use std::fs::{self, File, FileTimes, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use globset::GlobMatcher;

use crate::{Error, FileInfo, Result};

pub fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| Error::from_io(path, "reading", e))
}

/// Read a file as UTF-8 text.
pub fn read_text(path: &Path) -> Result<String> {
    let bytes = read_bytes(path)?;
    String::from_utf8(bytes).map_err(|source| Error::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Replace the contents of `path` in one step.
///
/// Missing parent directories are created first. Content goes to a uniquely
/// named sibling temp file which is synced and then renamed over the target,
/// so readers see either the old or the new content.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, "creating parent directory", e))?;
    }

    let temp_path = temp_sibling(path);
    let result = write_temp(&temp_path, content).and_then(|()| {
        fs::rename(&temp_path, path).map_err(|e| Error::io(path, "replacing", e))
    });

    if result.is_err() {
        // The temp file may not exist if creating it was what failed.
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.{}.tmp", name, uuid::Uuid::new_v4().simple()))
}

fn write_temp(temp_path: &Path, content: &[u8]) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(temp_path)
        .map_err(|e| Error::io(temp_path, "writing", e))?;
    file.write_all(content)
        .map_err(|e| Error::io(temp_path, "writing", e))?;
    file.sync_all()
        .map_err(|e| Error::io(temp_path, "writing", e))
}

pub fn write_bytes(path: &Path, content: &[u8]) -> Result<()> {
    write_atomic(path, content)
}

pub fn write_text(path: &Path, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}

/// Delete a file. Returns `false` if there was nothing to delete.
pub fn delete_file(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io(path, "deleting", e)),
    }
}

/// Copy a file, creating the destination's parent directories.
///
/// Permission bits and access/modification times are carried over. A missing
/// source fails before anything is created at the destination.
pub fn copy_file(source: &Path, destination: &Path) -> Result<()> {
    ensure_source(source, destination)?;
    create_destination_parent(destination)?;

    fs::copy(source, destination).map_err(|e| match e.kind() {
        ErrorKind::NotFound => Error::SourceNotFound {
            from: source.to_path_buf(),
            to: destination.to_path_buf(),
        },
        _ => Error::io(source, "copying", e),
    })?;

    if let Err(e) = copy_times(source, destination) {
        tracing::debug!(
            source = %source.display(),
            destination = %destination.display(),
            error = %e,
            "Could not preserve file times on copy"
        );
    }
    Ok(())
}

fn copy_times(source: &Path, destination: &Path) -> std::io::Result<()> {
    let metadata = fs::metadata(source)?;
    let times = FileTimes::new()
        .set_accessed(metadata.accessed()?)
        .set_modified(metadata.modified()?);
    File::options()
        .write(true)
        .open(destination)?
        .set_times(times)
}

/// Move a file, falling back to copy and delete across filesystems.
pub fn move_file(source: &Path, destination: &Path) -> Result<()> {
    ensure_source(source, destination)?;
    create_destination_parent(destination)?;

    match fs::rename(source, destination) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::SourceNotFound {
            from: source.to_path_buf(),
            to: destination.to_path_buf(),
        }),
        Err(e) if e.kind() == ErrorKind::CrossesDevices => {
            tracing::debug!(
                source = %source.display(),
                destination = %destination.display(),
                "Rename crosses filesystems, copying instead"
            );
            copy_file(source, destination)?;
            fs::remove_file(source).map_err(|e| Error::io(source, "deleting", e))
        }
        Err(e) => Err(Error::io(source, "moving", e)),
    }
}

fn ensure_source(source: &Path, destination: &Path) -> Result<()> {
    match fs::symlink_metadata(source) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::SourceNotFound {
            from: source.to_path_buf(),
            to: destination.to_path_buf(),
        }),
        Err(e) => Err(Error::io(source, "reading", e)),
    }
}

fn create_destination_parent(destination: &Path) -> Result<()> {
    match destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => fs::create_dir_all(parent)
            .map_err(|e| Error::io(parent, "creating destination directory", e)),
        None => Ok(()),
    }
}

/// True if `path` is an existing regular file. Never fails.
pub fn file_exists(path: &Path) -> bool {
    path.is_file()
}

/// True if `path` is an existing directory. Never fails.
pub fn directory_exists(path: &Path) -> bool {
    path.is_dir()
}

/// Create a directory. Succeeds if it already exists.
///
/// Without `parents`, a missing ancestor is an [`Error::Io`].
pub fn create_directory(path: &Path, parents: bool) -> Result<()> {
    let result = if parents {
        fs::create_dir_all(path)
    } else {
        fs::create_dir(path)
    };

    match result {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::AlreadyExists && path.is_dir() => Ok(()),
        Err(e) => Err(Error::io(path, "creating directory", e)),
    }
}

/// List the immediate children of `path` whose names match `pattern`.
///
/// Results are sorted by name. Subdirectories are listed but never entered.
pub fn list_directory(path: &Path, pattern: &GlobMatcher) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(path).map_err(|e| directory_error(path, "listing", e))?;

    let mut children = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(path, "listing", e))?;
        if pattern.is_match(entry.file_name()) {
            children.push(entry.path());
        }
    }
    children.sort();
    Ok(children)
}

/// Delete a directory. Returns `false` if there was nothing to delete.
///
/// Without `recursive`, a populated directory fails with [`Error::NotEmpty`].
pub fn delete_directory(path: &Path, recursive: bool) -> Result<bool> {
    let result = if recursive {
        fs::remove_dir_all(path)
    } else {
        fs::remove_dir(path)
    };

    match result {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) if e.kind() == ErrorKind::DirectoryNotEmpty => Err(Error::NotEmpty {
            path: path.to_path_buf(),
        }),
        Err(e) => Err(directory_error(path, "deleting directory", e)),
    }
}

fn directory_error(path: &Path, operation: &'static str, e: std::io::Error) -> Error {
    match e.kind() {
        ErrorKind::NotFound => Error::DirectoryNotFound {
            path: path.to_path_buf(),
        },
        ErrorKind::NotADirectory => Error::NotADirectory {
            path: path.to_path_buf(),
        },
        _ => Error::io(path, operation, e),
    }
}

/// Metadata snapshot for `path`, reported under its absolute path.
pub fn file_info(path: &Path) -> Result<FileInfo> {
    let metadata = fs::metadata(path).map_err(|e| Error::from_io(path, "reading metadata for", e))?;
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    FileInfo::from_metadata(&absolute, &metadata)
}
