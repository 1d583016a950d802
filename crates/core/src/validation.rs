//! Field-level validation.
//!
//! Validation failures are collected per field so a client can correct every
//! problem in one round trip. Messages are plain sentences; the key
//! [`NON_FIELD_ERRORS`] holds problems not tied to a single field.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{DomainError, DomainResult};

/// Key used for errors that do not belong to a specific field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";
pub const INVALID_EMAIL: &str = "Enter a valid email address.";
pub const NOT_A_NUMBER: &str = "A valid number is required.";
pub const NOT_A_BOOLEAN: &str = "Must be a valid boolean.";

/// Per-field validation messages, ordered by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, msg: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, msg);
        errors
    }

    pub fn non_field(msg: impl Into<String>) -> Self {
        Self::single(NON_FIELD_ERRORS, msg)
    }

    pub fn add(&mut self, field: impl Into<String>, msg: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(msg.into());
    }

    /// Record a missing required field.
    pub fn require<T>(&mut self, field: &str, value: &Option<T>) {
        if value.is_none() {
            self.add(field, REQUIRED);
        }
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// `Ok(())` when nothing was recorded, otherwise a validation error.
    pub fn into_result(self) -> DomainResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(self))
        }
    }
}

impl core::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for msg in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {msg}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Required, non-blank text bounded by `max_len` characters.
pub fn require_text(errors: &mut FieldErrors, field: &str, value: &str, max_len: usize) {
    if value.trim().is_empty() {
        errors.add(field, BLANK);
    } else {
        check_max_len(errors, field, value, max_len);
    }
}

pub fn check_max_len(errors: &mut FieldErrors, field: &str, value: &str, max_len: usize) {
    if value.chars().count() > max_len {
        errors.add(
            field,
            format!("Ensure this field has no more than {max_len} characters."),
        );
    }
}

/// Required email address in a plausible `local@domain.tld` shape.
pub fn check_email(errors: &mut FieldErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.add(field, BLANK);
    } else if !is_valid_email(value) {
        errors.add(field, INVALID_EMAIL);
    } else {
        check_max_len(errors, field, value, 255);
    }
}

pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.rsplit_once('@') else {
        return false;
    };
    if local.is_empty() || local.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_alphanumeric() || c == '-')
        })
}

/// Normalize an email address by lowercasing the domain part.
///
/// The local part is case-preserving; surrounding whitespace is dropped.
pub fn normalize_email(value: &str) -> String {
    let value = value.trim();
    match value.rsplit_once('@') {
        Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
        None => value.to_string(),
    }
}

/// A finite number greater than or equal to zero.
pub fn check_non_negative(errors: &mut FieldErrors, field: &str, value: f64) {
    if !value.is_finite() {
        errors.add(field, NOT_A_NUMBER);
    } else if value < 0.0 {
        errors.add(field, "Ensure this value is greater than or equal to 0.");
    }
}

/// A finite number strictly greater than zero.
pub fn check_positive(errors: &mut FieldErrors, field: &str, value: f64) {
    if !value.is_finite() {
        errors.add(field, NOT_A_NUMBER);
    } else if value <= 0.0 {
        errors.add(field, "Ensure this value is greater than 0.");
    }
}
