//! Error types for untract library.

use std::io;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for untract operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while loading, extracting or exporting results.
///
/// Missing references inside a block graph are never errors; they resolve to
/// empty text. These variants cover the collaborator layer and malformed input.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON could not be parsed or produced.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Input is not a collection of block-like records.
    #[error("Invalid analysis input: {0}")]
    InvalidInput(String),

    /// The analysis job reached a terminal failure state.
    #[error("Analysis job {job_id} failed: {message}")]
    JobFailed {
        /// Job identifier
        job_id: String,
        /// Status message reported by the provider
        message: String,
    },

    /// The analysis job did not finish within the polling budget.
    #[error("Analysis job {job_id} did not complete after {attempts} attempts ({waited:?})")]
    JobTimeout {
        /// Job identifier
        job_id: String,
        /// Number of status checks performed
        attempts: u32,
        /// Total time spent sleeping between checks
        waited: Duration,
    },

    /// Error raised by an analysis, metadata or storage provider.
    #[error("Provider error: {0}")]
    Provider(String),

    /// The metadata sidecar is missing or malformed.
    #[error("Metadata error: {0}")]
    Metadata(String),

    /// Required configuration is missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error during rendering (CSV, JSON).
    #[error("Rendering error: {0}")]
    Render(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::JobFailed {
            job_id: "job-1".to_string(),
            message: "bad document".to_string(),
        };
        assert_eq!(err.to_string(), "Analysis job job-1 failed: bad document");

        let err = Error::InvalidInput("expected an array".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid analysis input: expected an array"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
    }
}
