mod http;
mod memory;

use async_trait::async_trait;

use persona_core::{
    Feedback, Question, Session, SessionId, Test, TestHistoryEntry, TestId, TestResult, User,
};

use crate::error::ApiError;
use crate::sessions::AnswerMap;

pub use http::{ApiConfig, HttpGateway};
pub use memory::InMemoryBackend;

/// Backend contract consumed by the test-session core.
///
/// `HttpGateway` implements it over the real REST backend;
/// `InMemoryBackend` implements it in-process for testing and prototyping.
#[async_trait]
pub trait TestBackend: Send + Sync {
    /// Fetch the full test catalog.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport failure or a non-2xx response.
    async fn list_tests(&self) -> Result<Vec<Test>, ApiError>;

    /// Fetch the ordered question list for a test.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for an unknown test, `ApiError` otherwise.
    async fn questions_for_test(&self, test_id: TestId) -> Result<Vec<Question>, ApiError>;

    /// Ask the backend to allocate a new session for a test.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Auth` without a credential, `ApiError` otherwise.
    async fn create_session(&self, test_id: TestId) -> Result<Session, ApiError>;

    /// Submit the full answer set for a session.
    ///
    /// Intended to be called exactly once per session; re-submission
    /// behavior is server-defined and the client never retries on its own.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Auth` without a credential, `ApiError::Service`
    /// carrying the server's error text on a non-2xx response.
    async fn complete_session(
        &self,
        session_id: SessionId,
        answers: &AnswerMap,
    ) -> Result<(), ApiError>;

    /// Fetch the computed result for a submitted session.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Service` if the session has no result yet or does
    /// not exist.
    async fn fetch_result(&self, session_id: SessionId) -> Result<TestResult, ApiError>;

    /// Send a validated feedback record.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Auth` without a credential, `ApiError` otherwise.
    async fn send_feedback(&self, feedback: &Feedback) -> Result<(), ApiError>;

    /// Fetch the authenticated user's profile.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Auth` without a credential, `ApiError` otherwise.
    async fn fetch_profile(&self) -> Result<User, ApiError>;

    /// Fetch a user's completed-test history.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Auth` without a credential, `ApiError` otherwise.
    async fn history_for_user(&self, user_id: u64) -> Result<Vec<TestHistoryEntry>, ApiError>;
}
