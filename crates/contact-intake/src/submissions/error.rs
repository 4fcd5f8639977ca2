use std::collections::BTreeMap;

use axum::http::StatusCode;

use super::cursor::CursorError;
use super::store::StoreError;
use super::validation::ValidationErrors;

/// Error raised by the intake, query, and status flows.
#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("malformed request body: {0}")]
    MalformedBody(String),
    #[error("malformed query string: {0}")]
    MalformedQuery(String),
    #[error("Timestamp query parameter is required")]
    MissingTimestamp,
    #[error("Status field is required for updates")]
    MissingStatus,
    #[error("Invalid status value")]
    InvalidStatus(String),
    #[error("Invalid limit value")]
    InvalidLimit(String),
    #[error(transparent)]
    InvalidCursor(#[from] CursorError),
    #[error("Submission not found")]
    NotFound,
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for SubmissionError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound => Self::NotFound,
            other => Self::Store(other),
        }
    }
}

impl SubmissionError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SubmissionError::NotFound => StatusCode::NOT_FOUND,
            SubmissionError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Message safe to return to callers; store detail is never exposed.
    pub fn public_message(&self) -> String {
        match self {
            SubmissionError::Validation(_) => "Validation failed".to_string(),
            SubmissionError::MalformedBody(_) => "Invalid request body".to_string(),
            SubmissionError::MalformedQuery(_) => "Invalid query parameters".to_string(),
            SubmissionError::InvalidCursor(_) => "Invalid pagination token".to_string(),
            SubmissionError::Store(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    pub fn field_errors(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            SubmissionError::Validation(errors) => Some(&errors.0),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_not_found_maps_to_404() {
        let err = SubmissionError::from(StoreError::NotFound);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.public_message(), "Submission not found");
    }

    #[test]
    fn store_failures_hide_detail() {
        let err = SubmissionError::from(StoreError::Unavailable("disk on fire".to_string()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), "Internal server error");
        assert!(err.to_string().contains("disk on fire"));
    }

    #[test]
    fn status_errors_are_bad_requests_with_fixed_messages() {
        let cases = [
            (
                SubmissionError::MissingTimestamp,
                "Timestamp query parameter is required",
            ),
            (
                SubmissionError::MissingStatus,
                "Status field is required for updates",
            ),
            (
                SubmissionError::InvalidStatus("bogus".to_string()),
                "Invalid status value",
            ),
        ];
        for (err, message) in cases {
            assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
            assert_eq!(err.public_message(), message);
        }
    }
}
