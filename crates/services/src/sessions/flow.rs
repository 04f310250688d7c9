use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};

use client_store::ClientStore;
use persona_core::{FeedbackDraft, SessionId, TestId, TestResult};

use crate::error::FlowError;
use crate::gateway::TestBackend;
use crate::sessions::AnswerCollector;

/// Session lifecycle as observed by the client.
///
/// The only transitions are `Created -> Submitted -> ResultAvailable`;
/// there is no path back and no cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Created,
    Submitted,
    ResultAvailable,
}

/// Orchestrates one session from submission through result and feedback.
///
/// Methods take `&self` so a UI can hold the flow behind an `Arc` and invoke
/// it from independent event handlers; the in-flight flag rejects a
/// re-entrant submit (double-click) while one is still outstanding.
pub struct SessionFlow {
    backend: Arc<dyn TestBackend>,
    store: Arc<dyn ClientStore>,
    session_id: SessionId,
    state: Mutex<SessionState>,
    submit_in_flight: AtomicBool,
}

impl SessionFlow {
    /// Create a backend session for `test_id` and start the flow.
    ///
    /// Records the session-to-test cross-reference in the store so the
    /// feedback step can recover the test id later, even after a page
    /// reload.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::Api` if session creation fails and
    /// `FlowError::Store` if the cross-reference cannot be recorded.
    pub async fn start(
        backend: Arc<dyn TestBackend>,
        store: Arc<dyn ClientStore>,
        test_id: TestId,
    ) -> Result<Self, FlowError> {
        let session = backend.create_session(test_id).await?;
        store.remember_session(session.id, session.test_id).await?;
        debug!(session_id = %session.id, %test_id, "session started");

        Ok(Self {
            backend,
            store,
            session_id: session.id,
            state: Mutex::new(SessionState::Created),
            submit_in_flight: AtomicBool::new(false),
        })
    }

    /// Rebuild a flow for a session that was already submitted.
    ///
    /// The result view can be reached through a fresh page load carrying
    /// only the session id; it re-fetches by id instead of reusing
    /// in-memory state.
    #[must_use]
    pub fn resume(
        backend: Arc<dyn TestBackend>,
        store: Arc<dyn ClientStore>,
        session_id: SessionId,
    ) -> Self {
        Self {
            backend,
            store,
            session_id,
            state: Mutex::new(SessionState::Submitted),
            submit_in_flight: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        // State is Copy and mutated only in straight-line sections, so a
        // poisoned lock still holds a coherent value.
        match self.state.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn set_state(&self, next: SessionState) {
        match self.state.lock() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }

    /// Submit the collected answers for this session.
    ///
    /// Preconditions: the collector must be complete, no other submit may be
    /// in flight, and the session must not have been submitted already. A
    /// failed submit leaves the session in `Created` so the user can retry
    /// with the same session id.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::Incomplete`, `FlowError::SubmitInFlight`,
    /// `FlowError::AlreadySubmitted`, or `FlowError::Api` from the backend.
    pub async fn submit(&self, collector: &AnswerCollector) -> Result<(), FlowError> {
        if self.state() != SessionState::Created {
            return Err(FlowError::AlreadySubmitted);
        }
        if !collector.is_complete() {
            return Err(FlowError::Incomplete {
                answered: collector.answered_count(),
                total: collector.total_questions(),
            });
        }
        if self.submit_in_flight.swap(true, Ordering::SeqCst) {
            return Err(FlowError::SubmitInFlight);
        }

        let outcome = self
            .backend
            .complete_session(self.session_id, collector.answers())
            .await;
        self.submit_in_flight.store(false, Ordering::SeqCst);
        outcome?;

        self.set_state(SessionState::Submitted);
        debug!(session_id = %self.session_id, "answers submitted");
        Ok(())
    }

    /// Fetch the computed result for this session.
    ///
    /// Repeated calls are idempotent reads of the same result.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::NotSubmitted` before a successful submit.
    /// Afterwards a failed read is `FlowError::ResultUnavailable`, since the
    /// submission itself already succeeded irreversibly.
    pub async fn fetch_result(&self) -> Result<TestResult, FlowError> {
        if self.state() == SessionState::Created {
            return Err(FlowError::NotSubmitted);
        }

        let result = self
            .backend
            .fetch_result(self.session_id)
            .await
            .map_err(FlowError::ResultUnavailable)?;

        self.set_state(SessionState::ResultAvailable);
        Ok(result)
    }

    /// Validate and send feedback for the test behind this session.
    ///
    /// The test id comes from the store cross-reference recorded at session
    /// start; once the backend accepts the feedback, the cross-reference is
    /// cleared best-effort.
    ///
    /// # Errors
    ///
    /// Returns `FlowError::UnknownSessionTest` without a cross-reference,
    /// `FlowError::Feedback` for invalid input, and `FlowError::Api` from
    /// the backend.
    pub async fn send_feedback(&self, rating: u8, content: &str) -> Result<(), FlowError> {
        let test_id = self
            .store
            .test_for_session(self.session_id)
            .await?
            .ok_or(FlowError::UnknownSessionTest)?;

        let feedback = FeedbackDraft {
            rating,
            content: content.to_string(),
            test_id,
        }
        .validate()?;

        self.backend.send_feedback(&feedback).await?;

        if let Err(e) = self.store.forget_session(self.session_id).await {
            warn!(session_id = %self.session_id, error = %e, "failed to clear session cross-reference");
        }
        Ok(())
    }
}

impl fmt::Debug for SessionFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionFlow")
            .field("session_id", &self.session_id)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
