//! Field checks shared by the domain records

use std::sync::LazyLock;

use chosen_store::{FieldViolation, ValidationContext, ViolationKind};
use regex::Regex;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)+$")
        .expect("Invalid email regex")
});

pub(crate) fn email(location: &str, value: &str) -> Option<FieldViolation> {
    if EMAIL.is_match(value) {
        None
    } else {
        Some(FieldViolation::new(
            location,
            ViolationKind::InvalidValue,
            format!("'{value}' is not a valid email address"),
        ))
    }
}

/// Scores are percentages.
pub(crate) fn score(location: &str, value: f64) -> Option<FieldViolation> {
    if (0.0..=100.0).contains(&value) {
        None
    } else {
        Some(FieldViolation::new(
            location,
            ViolationKind::OutOfRange,
            "Score must be between 0 and 100",
        ))
    }
}

pub(crate) fn non_negative(location: &str, value: f64) -> Option<FieldViolation> {
    if value >= 0.0 && value.is_finite() {
        None
    } else {
        Some(FieldViolation::new(
            location,
            ViolationKind::OutOfRange,
            "must be a finite number greater than or equal to 0",
        ))
    }
}

pub(crate) fn optional_path(
    context: &ValidationContext,
    location: &str,
    value: Option<&str>,
) -> Option<FieldViolation> {
    value.and_then(|path| context.check_path(location, path))
}
