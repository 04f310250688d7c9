use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use persona_core::{
    Feedback, Question, Session, SessionId, Test, TestHistoryEntry, TestId, TestResult, User,
};

use crate::error::ApiError;
use crate::gateway::TestBackend;
use crate::sessions::AnswerMap;

#[derive(Default)]
struct BackendState {
    tests: Vec<Test>,
    questions: HashMap<TestId, Vec<Question>>,
    next_session_id: u64,
    sessions: HashMap<SessionId, TestId>,
    results: HashMap<SessionId, String>,
    feedback: Vec<Feedback>,
    profile: Option<User>,
    history: HashMap<u64, Vec<TestHistoryEntry>>,
    fail_next_complete: bool,
}

/// In-process `TestBackend` for testing and prototyping.
///
/// Mirrors the contract the real backend enforces: sessions are allocated
/// sequentially, a result exists only once its session was completed, and a
/// completed session keeps returning the same result string.
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    state: Arc<Mutex<BackendState>>,
}

impl InMemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a test and its ordered question list.
    pub fn add_test(&self, test: Test, questions: Vec<Question>) {
        let mut state = self.lock();
        state.questions.insert(test.id, questions);
        state.tests.push(test);
    }

    /// Set the profile returned by `fetch_profile`.
    pub fn set_profile(&self, user: User) {
        self.lock().profile = Some(user);
    }

    /// Seed history entries for a user.
    pub fn add_history(&self, user_id: u64, entries: Vec<TestHistoryEntry>) {
        self.lock().history.insert(user_id, entries);
    }

    /// Make the next `complete_session` call fail with a service error,
    /// for exercising the user-initiated retry path.
    pub fn fail_next_complete(&self) {
        self.lock().fail_next_complete = true;
    }

    /// Feedback records accepted so far.
    #[must_use]
    pub fn feedback(&self) -> Vec<Feedback> {
        self.lock().feedback.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BackendState> {
        // The mutex is only held across straight-line mutations.
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl TestBackend for InMemoryBackend {
    async fn list_tests(&self) -> Result<Vec<Test>, ApiError> {
        Ok(self.lock().tests.clone())
    }

    async fn questions_for_test(&self, test_id: TestId) -> Result<Vec<Question>, ApiError> {
        self.lock()
            .questions
            .get(&test_id)
            .cloned()
            .ok_or(ApiError::NotFound)
    }

    async fn create_session(&self, test_id: TestId) -> Result<Session, ApiError> {
        let mut state = self.lock();
        if !state.tests.iter().any(|t| t.id == test_id) {
            return Err(ApiError::NotFound);
        }

        state.next_session_id += 1;
        let id = SessionId::new(state.next_session_id);
        state.sessions.insert(id, test_id);
        Ok(Session { id, test_id })
    }

    async fn complete_session(
        &self,
        session_id: SessionId,
        answers: &AnswerMap,
    ) -> Result<(), ApiError> {
        let mut state = self.lock();
        if state.fail_next_complete {
            state.fail_next_complete = false;
            return Err(ApiError::Service {
                status: Some(500),
                message: "simulated backend failure".to_string(),
            });
        }

        let Some(test_id) = state.sessions.get(&session_id).copied() else {
            return Err(ApiError::Service {
                status: Some(404),
                message: format!("unknown session {session_id}"),
            });
        };

        let expected = state.questions.get(&test_id).map_or(0, Vec::len);
        if answers.len() != expected {
            return Err(ApiError::Service {
                status: Some(400),
                message: format!(
                    "expected {expected} answers for session {session_id}, got {}",
                    answers.len()
                ),
            });
        }

        state
            .results
            .insert(session_id, format!("result for session {session_id}"));
        Ok(())
    }

    async fn fetch_result(&self, session_id: SessionId) -> Result<TestResult, ApiError> {
        self.lock()
            .results
            .get(&session_id)
            .map(|result| TestResult {
                result: result.clone(),
            })
            .ok_or(ApiError::Service {
                status: Some(400),
                message: format!("session {session_id} has no result"),
            })
    }

    async fn send_feedback(&self, feedback: &Feedback) -> Result<(), ApiError> {
        self.lock().feedback.push(feedback.clone());
        Ok(())
    }

    async fn fetch_profile(&self) -> Result<User, ApiError> {
        self.lock().profile.clone().ok_or(ApiError::Auth)
    }

    async fn history_for_user(&self, user_id: u64) -> Result<Vec<TestHistoryEntry>, ApiError> {
        Ok(self.lock().history.get(&user_id).cloned().unwrap_or_default())
    }
}
