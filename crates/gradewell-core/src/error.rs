//! Error types shared across gradewell crates.
//!
//! `ProviderError` lives here rather than in `gradewell-providers` so the
//! grading workflow can log provider failures by kind without string matching.

use thiserror::Error;

/// Errors that can occur when interacting with a text-generation provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The response body did not have the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// The remote grader's output did not satisfy the grading schema.
#[derive(Debug, Error, PartialEq)]
pub enum SchemaError {
    #[error("response is not valid JSON: {0}")]
    Malformed(String),

    #[error("score {0} is outside 0..=100")]
    ScoreOutOfRange(f64),

    #[error("expected {expected} verdicts, got {actual}")]
    VerdictCount { expected: usize, actual: usize },
}

/// Precondition violations the grading workflow refuses to paper over.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GradingError {
    #[error("activity has no questions")]
    NoQuestions,

    #[error("duplicate question id: {0}")]
    DuplicateQuestionId(String),

    #[error("activity title is empty")]
    EmptyTitle,
}

/// Failures of portal operations.
#[derive(Debug, Error)]
pub enum PortalError {
    #[error("activity not found: {0}")]
    ActivityNotFound(String),

    #[error("activity {activity_id} is not assigned to {student_id}")]
    NotAssigned {
        activity_id: String,
        student_id: String,
    },

    #[error("duplicate activity id: {0}")]
    DuplicateActivity(String),

    #[error("no user is signed in")]
    NotSignedIn,

    #[error("event not found: {0}")]
    EventNotFound(String),

    #[error(transparent)]
    InvalidActivity(#[from] GradingError),

    #[error("failed to persist slot `{slot}`: {source}")]
    Persist {
        slot: &'static str,
        #[source]
        source: anyhow::Error,
    },
}
