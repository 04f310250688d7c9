use chrono::{DateTime, Utc};

use crate::model::ids::{SessionId, TestId};

/// Handle for one attempt at one test, allocated by the backend.
///
/// The client keeps the pair for the lifetime of the test-taking flow; the
/// session id is the correlation key for submission and result retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub id: SessionId,
    pub test_id: TestId,
}

/// Free-text personality assessment produced by the backend after
/// submission. Displayed verbatim; the client never interprets it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestResult {
    pub result: String,
}

/// One completed attempt as it appears in a user's test history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestHistoryEntry {
    pub session_id: SessionId,
    pub test_title: String,
    pub result: String,
    pub completed_at: Option<DateTime<Utc>>,
}
