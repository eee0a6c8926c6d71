//! Error types for eval-audit-core

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading and aggregating a report
///
/// Loading is all-or-nothing: any of these aborts the whole load and the
/// caller receives no partial case list.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error (from std::io)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File unreadable or container format unparsable
    #[error("Failed to load report: {0}")]
    Load(String),

    /// Required column absent from the input table
    #[error("Required column missing: {column}")]
    Schema {
        /// Name of the missing column
        column: String,
    },

    /// Unparsable score or case identifier
    #[error("Invalid value: {0}")]
    Value(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_display() {
        let err = Error::Load("not a zip archive".to_string());
        assert!(err.to_string().contains("not a zip archive"));
    }

    #[test]
    fn test_schema_error_display() {
        let err = Error::Schema {
            column: "CASE_ID".to_string(),
        };
        assert!(err.to_string().contains("CASE_ID"));
    }

    #[test]
    fn test_value_error_display() {
        let err = Error::Value("invalid TOTAL_SCORE 'N/A'".to_string());
        assert!(err.to_string().contains("N/A"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err: Error = io.into();
        assert!(err.to_string().contains("no such file"));
    }
}
