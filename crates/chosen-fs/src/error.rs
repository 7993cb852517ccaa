//! Error types for chosen-fs

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::{Map, Value, json};

/// Result type for chosen-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in chosen-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("File not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Source file not found while copying {from} to {to}")]
    SourceNotFound { from: PathBuf, to: PathBuf },

    #[error("Permission denied {operation} {path}")]
    AccessDenied {
        path: PathBuf,
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error {operation} {path}: {source}")]
    Io {
        path: PathBuf,
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("File is not valid UTF-8: {path}")]
    Decode {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Directory not empty: {path}")]
    NotEmpty { path: PathBuf },

    #[error("Could not acquire lock for {path} within {timeout:?}")]
    LockTimeout {
        path: PathBuf,
        lock_file: PathBuf,
        timeout: Duration,
        lock_file_exists: bool,
    },

    #[error("Invalid glob pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Invalid file info for {path}: {reason}")]
    InvalidFileInfo { path: PathBuf, reason: &'static str },
}

/// Stable classification of an [`Error`], independent of its message text.
///
/// Callers that translate errors into another protocol (status codes, exit
/// codes) match on this rather than on the variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    AccessDenied,
    Io,
    Decode,
    DirectoryNotFound,
    NotEmpty,
    LockTimeout,
    InvalidPattern,
    InvalidFileInfo,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "FILE_NOT_FOUND",
            Self::AccessDenied => "FILE_ACCESS_DENIED",
            Self::Io => "FILE_OPERATION_ERROR",
            Self::Decode => "FILE_DECODE_ERROR",
            Self::DirectoryNotFound => "DIRECTORY_NOT_FOUND",
            Self::NotEmpty => "DIRECTORY_NOT_EMPTY",
            Self::LockTimeout => "LOCK_TIMEOUT",
            Self::InvalidPattern => "INVALID_PATTERN",
            Self::InvalidFileInfo => "INVALID_FILE_INFO",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Map an OS error onto `NotFound`, `AccessDenied` or `Io`.
    ///
    /// Use this for operations where a missing path means the target is absent.
    pub fn from_io(path: impl Into<PathBuf>, operation: &'static str, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::io(path, operation, source),
        }
    }

    /// Map an OS error onto `AccessDenied` or `Io`.
    ///
    /// Use this for writes and directory creation, where a missing ancestor is a
    /// fault in the environment rather than an absent target.
    pub fn io(path: impl Into<PathBuf>, operation: &'static str, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::AccessDenied {
                path,
                operation,
                source,
            },
            _ => Self::Io {
                path,
                operation,
                source,
            },
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } | Self::SourceNotFound { .. } => ErrorKind::NotFound,
            Self::AccessDenied { .. } => ErrorKind::AccessDenied,
            Self::Io { .. } => ErrorKind::Io,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::DirectoryNotFound { .. } | Self::NotADirectory { .. } => {
                ErrorKind::DirectoryNotFound
            }
            Self::NotEmpty { .. } => ErrorKind::NotEmpty,
            Self::LockTimeout { .. } => ErrorKind::LockTimeout,
            Self::InvalidPattern { .. } => ErrorKind::InvalidPattern,
            Self::InvalidFileInfo { .. } => ErrorKind::InvalidFileInfo,
        }
    }

    /// Structured diagnostic fields for this error.
    pub fn details(&self) -> Map<String, Value> {
        let value = match self {
            Self::NotFound { path }
            | Self::DirectoryNotFound { path }
            | Self::NotEmpty { path } => json!({ "path": display(path) }),
            Self::NotADirectory { path } => json!({ "path": display(path), "reason": "not a directory" }),
            Self::SourceNotFound { from, to } => json!({ "source": display(from), "destination": display(to) }),
            Self::AccessDenied {
                path, operation, ..
            } => json!({ "path": display(path), "operation": operation }),
            Self::Io {
                path,
                operation,
                source,
            } => json!({ "path": display(path), "operation": operation, "error": source.to_string() }),
            Self::Decode { path, source } => json!({
                "path": display(path),
                "valid_up_to": source.utf8_error().valid_up_to(),
            }),
            Self::LockTimeout {
                path,
                lock_file,
                timeout,
                lock_file_exists,
            } => json!({
                "path": display(path),
                "lock_file": display(lock_file),
                "timeout": timeout.as_secs_f64(),
                "lock_file_exists": lock_file_exists,
            }),
            Self::InvalidPattern { pattern, reason } => {
                json!({ "pattern": pattern, "reason": reason })
            }
            Self::InvalidFileInfo { path, reason } => json!({ "path": display(path), "reason": reason }),
        };
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

fn display(path: &Path) -> Value {
    Value::String(path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_from_io_maps_three_classes() {
        let not_found = Error::from_io("a", "reading", io::Error::from(io::ErrorKind::NotFound));
        assert_eq!(not_found.kind(), ErrorKind::NotFound);

        let denied = Error::from_io(
            "a",
            "reading",
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert_eq!(denied.kind(), ErrorKind::AccessDenied);

        let other = Error::from_io("a", "reading", io::Error::other("disk on fire"));
        assert_eq!(other.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_io_treats_missing_path_as_fault() {
        let err = Error::io(
            "a/b",
            "creating directory",
            io::Error::from(io::ErrorKind::NotFound),
        );
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.to_string().contains("creating directory"));
    }

    #[test]
    fn test_lock_timeout_details() {
        let err = Error::LockTimeout {
            path: PathBuf::from("data/f.txt"),
            lock_file: PathBuf::from("data/.f.txt.lock"),
            timeout: Duration::from_millis(100),
            lock_file_exists: true,
        };

        let details = err.details();
        assert_eq!(details["path"], json!("data/f.txt"));
        assert_eq!(details["lock_file"], json!("data/.f.txt.lock"));
        assert_eq!(details["timeout"], json!(0.1));
        assert_eq!(details["lock_file_exists"], json!(true));
        assert_eq!(err.kind().as_str(), "LOCK_TIMEOUT");
    }

    #[test]
    fn test_not_a_directory_shares_kind_with_directory_not_found() {
        let err = Error::NotADirectory {
            path: PathBuf::from("file.txt"),
        };
        assert_eq!(err.kind(), ErrorKind::DirectoryNotFound);
    }
}
