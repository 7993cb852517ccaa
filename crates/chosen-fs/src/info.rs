//! Filesystem metadata snapshots

use std::fs::Metadata;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{Error, Result};

/// Metadata for a single file or directory, captured at query time.
///
/// Exactly one of [`is_file`](Self::is_file) and
/// [`is_directory`](Self::is_directory) is true.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileInfo {
    path: PathBuf,
    size: u64,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
    is_file: bool,
    is_directory: bool,
}

impl FileInfo {
    pub fn new(
        path: impl Into<PathBuf>,
        size: u64,
        created_at: DateTime<Utc>,
        modified_at: DateTime<Utc>,
        is_file: bool,
        is_directory: bool,
    ) -> Result<Self> {
        let path = path.into();
        if is_file == is_directory {
            let reason = if is_file {
                "entry cannot be both a file and a directory"
            } else {
                "entry must be either a file or a directory"
            };
            return Err(Error::InvalidFileInfo { path, reason });
        }

        Ok(Self {
            path,
            size,
            created_at,
            modified_at,
            is_file,
            is_directory,
        })
    }

    /// Build from `std::fs::Metadata`.
    ///
    /// Platforms without a birth time report the modification time as the
    /// creation time.
    pub fn from_metadata(path: &Path, metadata: &Metadata) -> Result<Self> {
        let modified_at = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .map_err(|e| Error::io(path, "reading metadata for", e))?;
        let created_at = metadata
            .created()
            .map(DateTime::<Utc>::from)
            .unwrap_or(modified_at);
        let size = if metadata.is_dir() { 0 } else { metadata.len() };

        Self::new(
            path,
            size,
            created_at,
            modified_at,
            metadata.is_file(),
            metadata.is_dir(),
        )
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size in bytes; always 0 for directories.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn modified_at(&self) -> DateTime<Utc> {
        self.modified_at
    }

    pub fn is_file(&self) -> bool {
        self.is_file
    }

    pub fn is_directory(&self) -> bool {
        self.is_directory
    }
}
