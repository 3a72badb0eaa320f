//! Error conversion implementations.
//!
//! This module contains From trait implementations to convert from the
//! errors of collaborating crates to the unified Error type.

use super::types::Error;

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ExtractionFailed(err.to_string())
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_cancelled() {
            Error::TaskFailed("task was aborted".to_string())
        } else {
            Error::TaskFailed(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zip_error_is_extraction_failure() {
        let err: Error = zip::result::ZipError::FileNotFound.into();
        assert!(matches!(err, Error::ExtractionFailed(_)));
    }

    #[test]
    fn test_invalid_input_message() {
        let err = Error::InvalidInput {
            path: "report.txt".into(),
            expected: "pbix".to_string(),
        };
        assert!(err.is_invalid_input());
        assert_eq!(
            err.to_string(),
            "Invalid input: report.txt is not a .pbix container"
        );
    }
}
