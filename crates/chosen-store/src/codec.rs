//! YAML encoding and decoding of records
//!
//! Records go through a JSON-compatible tree (`serde_json::Value`) on the
//! way out, so dates, ids and enums are rendered as their string forms and
//! struct fields keep declaration order. The tree is emitted as block-style
//! YAML with Unicode left unescaped. Strings that would read back as another
//! type (`yes`, `~`, `123`) are quoted, and multi-line strings become literal
//! blocks.

use serde_yaml::{Mapping, Value as YamlValue};

use crate::record::{FieldViolation, Record, ValidationContext, ViolationKind};
use crate::{Error, Result};

/// Convert a record to its JSON-compatible tree.
pub fn to_tree<R: Record>(record: &R) -> Result<serde_json::Value> {
    serde_json::to_value(record).map_err(|e| Error::Serialization {
        type_name: R::TYPE_NAME,
        message: e.to_string(),
    })
}

/// Render a record as a YAML document.
pub fn to_yaml<R: Record>(record: &R) -> Result<String> {
    let tree = to_tree(record)?;
    serde_yaml::to_string(&tree).map_err(|e| Error::Serialization {
        type_name: R::TYPE_NAME,
        message: e.to_string(),
    })
}

/// Parse a YAML document into a validated record.
///
/// An empty or `null` document is read as an empty mapping, so a record
/// whose fields all have defaults can be loaded from an empty file.
/// Malformed YAML fails with [`Error::Parse`]; a well-formed document that
/// does not fit `R` fails with [`Error::SchemaValidation`].
pub fn from_yaml<R: Record>(text: &str, context: &ValidationContext) -> Result<R> {
    let document: YamlValue = if is_blank(text) {
        YamlValue::Null
    } else {
        serde_yaml::from_str(text).map_err(|e| Error::Parse {
            type_name: R::TYPE_NAME,
            path: None,
            message: e.to_string(),
            line: e.location().map(|l| l.line()),
            column: e.location().map(|l| l.column()),
        })?
    };

    let record: R = match document {
        YamlValue::Null => {
            tracing::debug!(
                "YAML document is empty, validating {} from an empty mapping",
                R::TYPE_NAME
            );
            check_required::<R>(&Mapping::new())?;
            serde_yaml::from_value(YamlValue::Mapping(Mapping::new()))
                .map_err(|e| schema_error::<R>(&e))?
        }
        YamlValue::Mapping(mapping) => {
            check_required::<R>(&mapping)?;
            // Re-read from text so serde reports field paths.
            serde_yaml::from_str(text).map_err(|e| schema_error::<R>(&e))?
        }
        other => {
            return Err(Error::SchemaValidation {
                type_name: R::TYPE_NAME,
                path: None,
                violations: vec![FieldViolation::new(
                    "",
                    ViolationKind::InvalidType,
                    format!("expected a mapping, found {}", describe(&other)),
                )],
            });
        }
    };

    ensure_valid(&record, context)?;
    Ok(record)
}

/// Fail with every semantic violation `record` reports.
pub fn ensure_valid<R: Record>(record: &R, context: &ValidationContext) -> Result<()> {
    let violations = record.validate(context);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(Error::SchemaValidation {
            type_name: R::TYPE_NAME,
            path: None,
            violations,
        })
    }
}

/// True for a stream with no content besides comments and document markers.
fn is_blank(text: &str) -> bool {
    text.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#') || line == "---" || line == "..."
    })
}

fn check_required<R: Record>(mapping: &Mapping) -> Result<()> {
    let violations: Vec<_> = R::REQUIRED_FIELDS
        .iter()
        .filter(|field| !mapping.contains_key(**field))
        .map(|field| FieldViolation::new(*field, ViolationKind::Missing, "field required"))
        .collect();

    if violations.is_empty() {
        Ok(())
    } else {
        Err(Error::SchemaValidation {
            type_name: R::TYPE_NAME,
            path: None,
            violations,
        })
    }
}

fn schema_error<R: Record>(error: &serde_yaml::Error) -> Error {
    Error::SchemaValidation {
        type_name: R::TYPE_NAME,
        path: None,
        violations: vec![violation_from_message(&error.to_string())],
    }
}

/// Turn a serde error message such as
/// `messages[0]: missing field `body` at line 4 column 5` into a violation.
fn violation_from_message(message: &str) -> FieldViolation {
    let message = match message.rfind(" at line ") {
        Some(index) => &message[..index],
        None => message,
    };

    let (location, detail) = match message.split_once(": ") {
        Some((head, rest)) if !head.is_empty() && !head.contains(char::is_whitespace) => {
            (head.to_string(), rest)
        }
        _ => (String::new(), message),
    };

    if let Some(field) = detail
        .strip_prefix("missing field `")
        .and_then(|rest| rest.strip_suffix('`'))
    {
        let location = if location.is_empty() {
            field.to_string()
        } else {
            format!("{location}.{field}")
        };
        return FieldViolation::new(location, ViolationKind::Missing, "field required");
    }

    let kind = if detail.starts_with("invalid type") {
        ViolationKind::InvalidType
    } else {
        ViolationKind::InvalidValue
    };
    FieldViolation::new(location, kind, detail)
}

fn describe(value: &YamlValue) -> &'static str {
    match value {
        YamlValue::Null => "null",
        YamlValue::Bool(_) => "a boolean",
        YamlValue::Number(_) => "a number",
        YamlValue::String(_) => "a string",
        YamlValue::Sequence(_) => "a sequence",
        YamlValue::Mapping(_) => "a mapping",
        YamlValue::Tagged(_) => "a tagged value",
    }
}
