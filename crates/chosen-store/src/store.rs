//! Record persistence on top of the file primitives

use std::path::Path;

use chosen_fs::FileHandler;

use crate::codec;
use crate::record::{Record, ValidationContext};
use crate::Result;

/// Saves and loads records as YAML files.
///
/// No locks are taken here. Callers that need a consistent
/// load-modify-save cycle hold a [`chosen_fs::LockManager`] lock around it.
#[derive(Debug, Clone, Default)]
pub struct YamlStore {
    files: FileHandler,
    context: ValidationContext,
}

impl YamlStore {
    pub fn new(files: FileHandler, context: ValidationContext) -> Self {
        Self { files, context }
    }

    pub fn files(&self) -> &FileHandler {
        &self.files
    }

    pub fn context(&self) -> &ValidationContext {
        &self.context
    }

    pub fn serialize<R: Record>(&self, record: &R) -> Result<String> {
        codec::to_yaml(record)
    }

    pub fn deserialize<R: Record>(&self, text: &str) -> Result<R> {
        codec::from_yaml(text, &self.context)
    }

    /// Validate `record`, then replace the file at `path` with it.
    ///
    /// An invalid record is never written.
    pub async fn save<R: Record>(&self, record: &R, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        codec::ensure_valid(record, &self.context).map_err(|e| e.with_path(path))?;
        let text = self.serialize(record)?;
        self.files.write_text(path, text).await?;
        tracing::debug!(path = %path.display(), "Saved {}", R::TYPE_NAME);
        Ok(())
    }

    pub async fn load<R: Record>(&self, path: impl AsRef<Path>) -> Result<R> {
        let path = path.as_ref();
        let text = self.files.read_text(path).await?;
        self.deserialize(&text).map_err(|e| e.with_path(path))
    }
}
