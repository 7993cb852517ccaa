//! Record and entity contracts
//!
//! A [`Record`] is anything the store can persist: it serializes to a
//! JSON-compatible tree through serde and can report semantic violations
//! serde cannot express (ranges, formats, cross-field rules). An [`Entity`]
//! is a record with an id, stored one file per id by a repository.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub trait Record: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Name used in diagnostics.
    const TYPE_NAME: &'static str;

    /// Top-level fields without a default. All missing ones are reported
    /// together before serde gets to see the document.
    const REQUIRED_FIELDS: &'static [&'static str] = &[];

    /// Semantic checks beyond what deserialization enforces.
    fn validate(&self, _context: &ValidationContext) -> Vec<FieldViolation> {
        Vec::new()
    }
}

pub trait Entity: Record {
    fn id(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    Missing,
    InvalidType,
    InvalidValue,
    OutOfRange,
    OutsideDataRoot,
}

/// One field-level problem found while validating a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Dotted path to the field, e.g. `messages[2].attachments[0]`.
    /// Empty for the document root.
    pub location: String,
    pub kind: ViolationKind,
    pub message: String,
}

impl FieldViolation {
    pub fn new(location: impl Into<String>, kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            kind,
            message: message.into(),
        }
    }

    /// Re-root a violation reported by a nested record under `parent`.
    pub fn nested(mut self, parent: &str) -> Self {
        self.location = if self.location.is_empty() {
            parent.to_string()
        } else if self.location.starts_with('[') {
            format!("{parent}{}", self.location)
        } else {
            format!("{parent}.{}", self.location)
        };
        self
    }

    pub fn to_json(&self) -> Value {
        json!({
            "loc": self.location,
            "type": self.kind,
            "msg": self.message,
        })
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.location.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.location, self.message)
        }
    }
}

/// Re-root every violation in `violations` under `parent`.
pub fn nest_all(violations: Vec<FieldViolation>, parent: &str) -> Vec<FieldViolation> {
    violations.into_iter().map(|v| v.nested(parent)).collect()
}

/// Environment a record is validated against.
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    data_root: Option<PathBuf>,
}

impl ValidationContext {
    /// Context that checks stored relative paths against `data_root`.
    pub fn with_data_root(data_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: Some(data_root.into()),
        }
    }

    pub fn data_root(&self) -> Option<&Path> {
        self.data_root.as_deref()
    }

    /// Check that `value`, interpreted relative to the data root, does not
    /// resolve outside it. Always passes without a data root.
    pub fn check_path(&self, location: &str, value: &str) -> Option<FieldViolation> {
        let root = self.data_root.as_deref()?;
        match chosen_fs::path::resolve_within(root, Path::new(value)) {
            Some(_) => None,
            None => Some(FieldViolation::new(
                location,
                ViolationKind::OutsideDataRoot,
                format!("path '{value}' resolves outside the data directory"),
            )),
        }
    }
}
