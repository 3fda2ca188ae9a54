//! Error Taxonomy
//!
//! Two families of errors reach callers of the orchestrator:
//! - `ValidationError`: bad input. Surfaced as `400 Bad Request` and never retried.
//! - `ServiceError`: wraps validation failures and adds the conditions that depend
//!   on service state (index not built yet, engine failure).
//!
//! Build failures are deliberately absent: they are recorded into the build state
//! and only observable through `/health`.

use crate::term::Term;
use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Invalid semester '{given}'. Must be one of: Fall, Spring, Summer, Winter")]
    InvalidSemester { given: String },

    #[error("year {year} is out of range [{min}, {max}]")]
    YearOutOfRange { year: i32, min: i32, max: i32 },

    #[error("year and semester are required when no default term is configured")]
    TermRequired,

    #[error("invalid term '{given}', expected '<year> <semester>' (e.g. '2025 Fall')")]
    InvalidTermFormat { given: String },

    #[error("query is required")]
    EmptyQuery,

    #[error("threshold {0} must be between 0.0 and 1.0")]
    InvalidThreshold(f32),
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The term resolved fine but no index has been built for it yet.
    #[error("index for {term} is not ready yet")]
    NotReady { term: Term },

    #[error("search failed: {0:#}")]
    Engine(anyhow::Error),
}

impl ServiceError {
    /// HTTP status the API layer reports for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotReady { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ServiceError::Engine(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_error_compares_and_maps_to_bad_request() {
        let err = ValidationError::InvalidThreshold(1.5);

        assert_eq!(err, ValidationError::InvalidThreshold(1.5));
        assert_ne!(err, ValidationError::InvalidThreshold(0.5));
        assert_eq!(
            ServiceError::from(err).status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
