//! Shared error types for the services crate.

use thiserror::Error;

use client_store::StoreError;
use persona_core::{FeedbackError, QuestionId, TestId};

/// Errors surfaced by the backend gateway.
///
/// Every transport, decode or status failure is folded into one of these
/// three kinds at the gateway boundary; nothing downstream sees a raw
/// `reqwest::Error`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    /// Missing or rejected credential. Surfaced as "please log in".
    #[error("authentication required")]
    Auth,

    /// The requested test or session does not exist.
    #[error("not found")]
    NotFound,

    /// Any other non-2xx response or transport failure, carrying the
    /// server's message text when one was available.
    #[error("service failure: {message}")]
    Service {
        status: Option<u16>,
        message: String,
    },
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Service {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Service {
            status: None,
            message: e.to_string(),
        }
    }
}

/// Errors emitted by `CatalogService`.
///
/// Missing content (`UnknownSlug`, `NoQuestions`) is kept distinct from
/// transport failure so callers can render "not found" and "try again"
/// differently.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("no test matches slug {0:?}")]
    UnknownSlug(String),

    #[error("test {0} has no questions")]
    NoQuestions(TestId),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors emitted by `AnswerCollector`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CollectorError {
    #[error("no questions loaded for session")]
    Empty,

    #[error("question {0} is not part of the loaded set")]
    UnknownQuestion(QuestionId),
}

/// Errors emitted by `SessionFlow`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FlowError {
    #[error("cannot submit: {answered} of {total} questions answered")]
    Incomplete { answered: usize, total: usize },

    #[error("a submission is already in flight")]
    SubmitInFlight,

    #[error("session has already been submitted")]
    AlreadySubmitted,

    #[error("session has not been submitted yet")]
    NotSubmitted,

    /// Submission succeeded irreversibly, only the result read failed.
    #[error("your answers were saved, but the result could not be loaded")]
    ResultUnavailable(#[source] ApiError),

    #[error("no test recorded for this session")]
    UnknownSessionTest,

    #[error(transparent)]
    Feedback(#[from] FeedbackError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Api(#[from] ApiError),
}
