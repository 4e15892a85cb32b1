//! Error types for the adagg connectors.
//!
//! Everything here is invocation-level: any of these errors aborts the
//! current invocation before an output object is written, and is surfaced to
//! the caller so the trigger runtime can retry.

use thiserror::Error;

/// Errors that can occur while running one aggregation invocation.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The trigger payload does not carry a bucket and key.
    #[error("Invalid event structure: {0}")]
    InvalidEventStructure(String),

    /// The input object could not be read.
    #[error("Storage read error for {location}: {message}")]
    StorageReadError { location: String, message: String },

    /// The output object could not be written.
    #[error("Storage write error for {location}: {message}")]
    StorageWriteError { location: String, message: String },

    /// Serialization or compression of the summary failed.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Local I/O error (file, stdin, etc).
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for connector operations.
pub type Result<T> = std::result::Result<T, ConnectorError>;

impl From<serde_json::Error> for ConnectorError {
    fn from(e: serde_json::Error) -> Self {
        ConnectorError::SerializationError(e.to_string())
    }
}

impl From<adagg_core::Error> for ConnectorError {
    fn from(e: adagg_core::Error) -> Self {
        match e {
            adagg_core::Error::InvalidConfig(msg) => ConnectorError::ConfigError(msg),
            adagg_core::Error::Io(io) => ConnectorError::IoError(io),
            other => ConnectorError::SerializationError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_display_contains(err: &ConnectorError, expected: &str) {
        let msg = format!("{}", err);
        assert!(
            msg.contains(expected),
            "Expected display '{}' to contain '{}'",
            msg,
            expected
        );
    }

    #[test]
    fn test_storage_errors_name_location() {
        let err = ConnectorError::StorageReadError {
            location: "s3://in/batch.json".to_string(),
            message: "Object not found".to_string(),
        };
        assert_display_contains(&err, "Storage read error");
        assert_display_contains(&err, "s3://in/batch.json");

        let err = ConnectorError::StorageWriteError {
            location: "s3://out/2024/01/01/aggregated_stats.json.gz".to_string(),
            message: "access denied".to_string(),
        };
        assert_display_contains(&err, "Storage write error");
        assert_display_contains(&err, "access denied");
    }

    #[test]
    fn test_invalid_event_structure() {
        let err = ConnectorError::InvalidEventStructure("missing 'Records'".to_string());
        assert_display_contains(&err, "Invalid event structure");
        assert_display_contains(&err, "Records");
    }

    #[test]
    fn test_from_core_errors() {
        let err: ConnectorError =
            adagg_core::Error::InvalidConfig("unknown campaign policy".to_string()).into();
        assert!(matches!(err, ConnectorError::ConfigError(_)));

        let err: ConnectorError = adagg_core::Error::Compression("boom".to_string()).into();
        assert!(matches!(err, ConnectorError::SerializationError(_)));
        assert_display_contains(&err, "boom");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err: ConnectorError = json_err.into();
        assert_display_contains(&err, "Serialization error");
    }

    #[test]
    fn test_io_error_has_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = ConnectorError::IoError(io_err);
        assert!(std::error::Error::source(&err).is_some());
    }
}
