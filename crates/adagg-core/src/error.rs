//! Error Types for adagg
//!
//! This module defines the two error families used by the aggregation engine.
//!
//! ## Line/Record Rejections
//!
//! Malformed input is data, not control flow. A line that cannot be used is
//! described by a [`Rejection`] value and collected next to the summary:
//! - `MalformedInput`: the line is not valid UTF-8 or not a JSON object
//! - `MissingField`: a field required for aggregation is absent
//! - `InvalidFieldType`: a field holds a value that cannot be coerced
//!
//! Rejections never abort a batch.
//!
//! ## Engine Errors
//!
//! [`Error`] is reserved for failures that make the whole batch unusable,
//! such as failing to serialize or compress the summary artifact.
//! All fallible engine functions return `Result<T>`, aliased to
//! `Result<T, Error>`, so errors propagate with `?`.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Compression error: {0}")]
    Compression(String),

    #[error("Decompression error: {0}")]
    Decompression(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

/// Why a single input line was not folded into the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectionKind {
    MalformedInput,
    MissingField,
    InvalidFieldType,
}

impl fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectionKind::MalformedInput => write!(f, "MalformedInput"),
            RejectionKind::MissingField => write!(f, "MissingField"),
            RejectionKind::InvalidFieldType => write!(f, "InvalidFieldType"),
        }
    }
}

/// A tagged, human-readable rejection reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub kind: RejectionKind,
    pub detail: String,
}

impl Rejection {
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self {
            kind: RejectionKind::MalformedInput,
            detail: detail.into(),
        }
    }

    pub fn missing_field(field: &str) -> Self {
        Self {
            kind: RejectionKind::MissingField,
            detail: format!("missing field '{}'", field),
        }
    }

    pub fn invalid_type(field: &str, found: &str) -> Self {
        Self {
            kind: RejectionKind::InvalidFieldType,
            detail: format!("field '{}' has unsupported type {}", field, found),
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Serialization("bad float".to_string());
        assert_eq!(err.to_string(), "Serialization error: bad float");

        let err = Error::Decompression("invalid gzip header".to_string());
        assert!(err.to_string().contains("invalid gzip header"));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_rejection_constructors() {
        let r = Rejection::missing_field("campaign_id");
        assert_eq!(r.kind, RejectionKind::MissingField);
        assert!(r.detail.contains("campaign_id"));

        let r = Rejection::invalid_type("duration", "array");
        assert_eq!(r.kind, RejectionKind::InvalidFieldType);
        assert_eq!(r.to_string(), "InvalidFieldType: field 'duration' has unsupported type array");
    }
}
