//! Error types for chosen-store

use std::path::PathBuf;

use serde_json::{Map, Value, json};

use crate::record::FieldViolation;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Fs(#[from] chosen_fs::Error),

    #[error("Invalid YAML for {type_name}: {message}")]
    Parse {
        type_name: &'static str,
        path: Option<PathBuf>,
        message: String,
        line: Option<usize>,
        column: Option<usize>,
    },

    #[error("YAML data does not match {type_name} schema: {}", summarize(.violations))]
    SchemaValidation {
        type_name: &'static str,
        path: Option<PathBuf>,
        violations: Vec<FieldViolation>,
    },

    #[error("Failed to serialize {type_name}: {message}")]
    Serialization {
        type_name: &'static str,
        message: String,
    },

    #[error("Invalid entity id '{id}': {reason}")]
    InvalidEntityId { id: String, reason: &'static str },
}

/// Stable classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Fs(chosen_fs::ErrorKind),
    Parse,
    SchemaValidation,
    Serialization,
    InvalidEntityId,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fs(kind) => kind.as_str(),
            Self::Parse => "YAML_PARSE_ERROR",
            Self::SchemaValidation => "SCHEMA_VALIDATION_ERROR",
            Self::Serialization => "SERIALIZATION_ERROR",
            Self::InvalidEntityId => "INVALID_ENTITY_ID",
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
            Self::Fs(e) => ErrorKind::Fs(e.kind()),
            Self::Parse { .. } => ErrorKind::Parse,
            Self::SchemaValidation { .. } => ErrorKind::SchemaValidation,
            Self::Serialization { .. } => ErrorKind::Serialization,
            Self::InvalidEntityId { .. } => ErrorKind::InvalidEntityId,
        }
    }

    /// Structured diagnostic fields for this error.
    pub fn details(&self) -> Map<String, Value> {
        let value = match self {
            Self::Fs(e) => return e.details(),
            Self::Parse {
                type_name,
                path,
                message,
                line,
                column,
            } => json!({
                "model_type": type_name,
                "path": path.as_ref().map(|p| p.display().to_string()),
                "error": message,
                "line": line,
                "column": column,
            }),
            Self::SchemaValidation {
                type_name,
                path,
                violations,
            } => json!({
                "model_type": type_name,
                "path": path.as_ref().map(|p| p.display().to_string()),
                "validation_errors": violations
                    .iter()
                    .map(FieldViolation::to_json)
                    .collect::<Vec<_>>(),
            }),
            Self::Serialization { type_name, message } => {
                json!({ "model_type": type_name, "error": message })
            }
            Self::InvalidEntityId { id, reason } => json!({ "id": id, "reason": reason }),
        };
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    /// True when the underlying file was absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Fs(e) if e.is_not_found())
    }

    /// Attach the file a document was read from.
    pub(crate) fn with_path(mut self, file: impl Into<PathBuf>) -> Self {
        if let Self::Parse { path, .. } | Self::SchemaValidation { path, .. } = &mut self {
            *path = Some(file.into());
        }
        self
    }
}

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ViolationKind;

    #[test]
    fn test_schema_validation_lists_every_violation() {
        let err = Error::SchemaValidation {
            type_name: "Conversation",
            path: None,
            violations: vec![
                FieldViolation::new("platform", ViolationKind::Missing, "field required"),
                FieldViolation::new("recruiter_name", ViolationKind::Missing, "field required"),
            ],
        };

        let message = err.to_string();
        assert!(message.contains("platform: field required"));
        assert!(message.contains("recruiter_name: field required"));

        let details = err.details();
        assert_eq!(details["validation_errors"].as_array().unwrap().len(), 2);
        assert_eq!(err.kind().as_str(), "SCHEMA_VALIDATION_ERROR");
    }

    #[test]
    fn test_fs_errors_keep_their_kind() {
        let err = Error::from(chosen_fs::Error::NotFound {
            path: PathBuf::from("x.yaml"),
        });

        assert!(err.is_not_found());
        assert_eq!(err.kind().as_str(), "FILE_NOT_FOUND");
        assert_eq!(err.details()["path"], json!("x.yaml"));
    }

    #[test]
    fn test_with_path_only_touches_document_errors() {
        let err = Error::Parse {
            type_name: "Conversation",
            path: None,
            message: "bad indentation".to_string(),
            line: Some(2),
            column: Some(3),
        }
        .with_path("data/c.yaml");

        assert_eq!(err.details()["path"], json!("data/c.yaml"));
        assert_eq!(err.details()["line"], json!(2));
    }
}
