//! Error types for payment initiation

use crate::schema::Requirement;
use std::fmt;
use thiserror::Error;

/// Result type for message operations
pub type Result<T> = std::result::Result<T, Error>;

/// Message building errors
#[derive(Error, Debug)]
pub enum Error {
    /// One or more fields failed validation
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// No known schema accepts the transaction set
    #[error("Schema incompatibility: {0}")]
    SchemaIncompatible(SchemaIncompatibility),

    /// Requested schema is not known for this message kind
    #[error("Unknown schema: {0}")]
    UnknownSchema(String),

    /// XML serialization error
    #[error("Render error: {0}")]
    Render(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ValidationErrors> for Error {
    fn from(errors: ValidationErrors) -> Self {
        Error::Validation(errors)
    }
}

impl From<SchemaIncompatibility> for Error {
    fn from(incompatibility: SchemaIncompatibility) -> Self {
        Error::SchemaIncompatible(incompatibility)
    }
}

impl Error {
    /// Field errors carried by a validation failure
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Error::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

/// A single invalid field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Path of the offending field, e.g. `requested_date` or `account.iban`
    pub field: String,

    /// Human readable reason
    pub message: String,
}

impl ValidationError {
    /// Create new validation error
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

/// Collected validation errors
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationError::new(field, message));
    }

    /// Merge errors of a nested entity, prefixing their field paths
    pub fn merge(&mut self, prefix: &str, other: ValidationErrors) {
        self.errors.extend(other.errors.into_iter().map(|e| ValidationError {
            field: format!("{}.{}", prefix, e.field),
            message: e.message,
        }));
    }

    /// `true` when nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of recorded errors
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Iterate over recorded errors
    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter()
    }

    /// `true` when an error was recorded for `field`
    pub fn contains_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    /// `Ok(())` when empty, otherwise the collection as an error
    pub fn into_result(self) -> std::result::Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Why a schema was not chosen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaRejection {
    /// Schema identifier, e.g. `pain.001.001.03`
    pub schema: &'static str,

    /// First requirement that failed
    pub requirement: Requirement,

    /// Index of the first transaction violating it
    pub transaction_index: usize,
}

/// No schema accepts every transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaIncompatibility {
    /// One rejection per evaluated schema, in preference order
    pub rejections: Vec<SchemaRejection>,
}

impl fmt::Display for SchemaIncompatibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .rejections
            .iter()
            .map(|r| {
                format!(
                    "{} requires {} (transaction #{})",
                    r.schema,
                    r.requirement,
                    r.transaction_index + 1
                )
            })
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for SchemaIncompatibility {}
