//! Error types for chosen-core

use std::path::PathBuf;

use serde_json::{Map, Value, json};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] chosen_store::Error),

    #[error("Invalid configuration at {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {message}")]
    InvalidSetting { key: String, message: String },

    #[error("Unknown {kind} '{value}'")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("Conversation not found: {id}")]
    ConversationNotFound { id: String },

    #[error("Failed to initialize logging: {message}")]
    Logging { message: String },
}

impl From<chosen_fs::Error> for Error {
    fn from(e: chosen_fs::Error) -> Self {
        Self::Store(e.into())
    }
}

/// Stable classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Store(chosen_store::ErrorKind),
    Config,
    InvalidValue,
    ConversationNotFound,
    Logging,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Store(kind) => kind.as_str(),
            Self::Config => "CONFIGURATION_ERROR",
            Self::InvalidValue => "INVALID_VALUE",
            Self::ConversationNotFound => "CONVERSATION_NOT_FOUND",
            Self::Logging => "LOGGING_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Store(e) => ErrorKind::Store(e.kind()),
            Self::Config { .. } | Self::InvalidSetting { .. } => ErrorKind::Config,
            Self::UnknownVariant { .. } => ErrorKind::InvalidValue,
            Self::ConversationNotFound { .. } => ErrorKind::ConversationNotFound,
            Self::Logging { .. } => ErrorKind::Logging,
        }
    }

    /// Structured diagnostic fields for this error.
    pub fn details(&self) -> Map<String, Value> {
        let value = match self {
            Self::Store(e) => return e.details(),
            Self::Config { path, message } => {
                json!({ "path": path.display().to_string(), "error": message })
            }
            Self::InvalidSetting { key, message } => json!({ "key": key, "error": message }),
            Self::UnknownVariant { kind, value } => json!({ "kind": kind, "value": value }),
            Self::ConversationNotFound { id } => json!({ "id": id }),
            Self::Logging { message } => json!({ "error": message }),
        };
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    /// True when a file or conversation that had to exist was absent.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Store(e) => e.is_not_found(),
            Self::ConversationNotFound { .. } => true,
            _ => false,
        }
    }
}
