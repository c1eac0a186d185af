// models/src/errors.rs

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

/// A value outside one of the closed enumerations (gender, specialization).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unrecognized value `{value}` for {field}")]
pub struct UnknownVariant {
    pub field: &'static str,
    pub value: String,
}

/// Field-level validation failures for one request body.
///
/// Handlers accumulate every problem before rejecting, so a caller that
/// omits three fields learns about all three at once.
#[derive(Debug, Clone, Default, Error, PartialEq, Eq, Serialize)]
#[error("invalid input")]
pub struct ValidationError {
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ValidationError {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one failure message against a field.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// A report holding a single failure.
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut report = Self::new();
        report.add(field, message);
        report
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Converts an accumulated report into a `Result`, erring when any
    /// failure was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl From<UnknownVariant> for ValidationError {
    fn from(err: UnknownVariant) -> Self {
        ValidationError::single(err.field, err.to_string())
    }
}

/// A type alias for a `Result` that returns a `ValidationError` on failure.
pub type ValidationResult<T> = Result<T, ValidationError>;
