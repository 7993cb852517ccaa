//! Async facade over the blocking primitives in [`io`](crate::io)

use std::path::{Path, PathBuf};

use crate::{Error, FileInfo, Result, io};

/// Non-blocking access to the file primitives.
///
/// Each call moves its filesystem work onto tokio's blocking pool, so many
/// operations can be in flight from one task without stalling the runtime.
/// Calls on the same path are not ordered relative to each other; hold a
/// lock from [`LockManager`](crate::LockManager) for that.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileHandler;

impl FileHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn read_text(&self, path: impl AsRef<Path>) -> Result<String> {
        let path = path.as_ref().to_path_buf();
        blocking(&path, io::read_text).await
    }

    pub async fn read_bytes(&self, path: impl AsRef<Path>) -> Result<Vec<u8>> {
        let path = path.as_ref().to_path_buf();
        blocking(&path, io::read_bytes).await
    }

    pub async fn write_text(&self, path: impl AsRef<Path>, content: impl Into<String>) -> Result<()> {
        let path = path.as_ref().to_path_buf();
        let content = content.into();
        blocking(&path, move |p| io::write_text(p, &content)).await
    }

    pub async fn write_bytes(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) -> Result<()> {
        let path = path.as_ref().to_path_buf();
        let content = content.into();
        blocking(&path, move |p| io::write_bytes(p, &content)).await
    }

    pub async fn delete_file(&self, path: impl AsRef<Path>) -> Result<bool> {
        let path = path.as_ref().to_path_buf();
        blocking(&path, io::delete_file).await
    }

    pub async fn copy_file(&self, source: impl AsRef<Path>, destination: impl AsRef<Path>) -> Result<()> {
        let source = source.as_ref().to_path_buf();
        let destination = destination.as_ref().to_path_buf();
        blocking(&source, move |s| io::copy_file(s, &destination)).await
    }

    pub async fn move_file(&self, source: impl AsRef<Path>, destination: impl AsRef<Path>) -> Result<()> {
        let source = source.as_ref().to_path_buf();
        let destination = destination.as_ref().to_path_buf();
        blocking(&source, move |s| io::move_file(s, &destination)).await
    }

    pub async fn file_exists(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref().to_path_buf();
        blocking(&path, move |p| Ok(io::file_exists(p)))
            .await
            .unwrap_or(false)
    }

    pub async fn directory_exists(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref().to_path_buf();
        blocking(&path, move |p| Ok(io::directory_exists(p)))
            .await
            .unwrap_or(false)
    }

    pub async fn create_directory(&self, path: impl AsRef<Path>, parents: bool) -> Result<()> {
        let path = path.as_ref().to_path_buf();
        blocking(&path, move |p| io::create_directory(p, parents)).await
    }

    /// List immediate children of `path` matching the glob `pattern`.
    ///
    /// The pattern is validated before the directory is touched.
    pub async fn list_directory(&self, path: impl AsRef<Path>, pattern: &str) -> Result<Vec<PathBuf>> {
        let matcher = crate::path::compile_pattern(pattern)?;
        let path = path.as_ref().to_path_buf();
        blocking(&path, move |p| io::list_directory(p, &matcher)).await
    }

    pub async fn delete_directory(&self, path: impl AsRef<Path>, recursive: bool) -> Result<bool> {
        let path = path.as_ref().to_path_buf();
        blocking(&path, move |p| io::delete_directory(p, recursive)).await
    }

    pub async fn file_info(&self, path: impl AsRef<Path>) -> Result<FileInfo> {
        let path = path.as_ref().to_path_buf();
        blocking(&path, io::file_info).await
    }
}

async fn blocking<T, F>(path: &Path, f: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&Path) -> Result<T> + Send + 'static,
{
    let owned = path.to_path_buf();
    tokio::task::spawn_blocking(move || f(&owned))
        .await
        .map_err(|e| Error::Io {
            path: path.to_path_buf(),
            operation: "waiting for",
            source: std::io::Error::other(e.to_string()),
        })?
}
