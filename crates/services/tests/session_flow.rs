use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Notify;

use client_store::{ClientStore, InMemoryStore};
use persona_core::{
    AnswerValue, Feedback, Question, QuestionId, Role, Session, SessionId, Test, TestHistoryEntry,
    TestId, TestResult, User,
};
use services::{
    AnswerCollector, ApiError, AppServices, FlowError, InMemoryBackend, SessionState, TestBackend,
};

fn seeded_backend() -> InMemoryBackend {
    let backend = InMemoryBackend::new();
    let test_id = TestId::new(1);
    backend.add_test(
        Test {
            id: test_id,
            title: "MBTI Test".to_string(),
            description: "16 types".to_string(),
            created_at: None,
        },
        vec![
            Question::new(QuestionId::new(1), "I enjoy large gatherings", test_id),
            Question::new(QuestionId::new(2), "I plan before acting", test_id),
            Question::new(QuestionId::new(3), "I trust my gut", test_id),
        ],
    );
    backend
}

fn app_with(backend: InMemoryBackend) -> AppServices {
    AppServices::new(
        Arc::new(backend),
        Arc::new(InMemoryStore::with_token("tok")),
    )
}

async fn answered_collector(app: &AppServices, test_id: TestId) -> AnswerCollector {
    let questions = app.catalog().load_questions(test_id).await.unwrap();
    let mut collector = AnswerCollector::new(questions).unwrap();
    collector
        .set_answer(QuestionId::new(1), AnswerValue::StronglyAgree)
        .unwrap();
    collector
        .set_answer(QuestionId::new(2), AnswerValue::StronglyDisagree)
        .unwrap();
    collector
        .set_answer(QuestionId::new(3), AnswerValue::Neutral)
        .unwrap();
    collector
}

#[tokio::test]
async fn full_session_runs_from_slug_to_feedback() {
    let backend = seeded_backend();
    let app = app_with(backend.clone());

    let test = app.catalog().resolve_test("mbti-test").await.unwrap();
    let collector = answered_collector(&app, test.id).await;
    assert!(collector.is_complete());

    let flow = app.start_session(test.id).await.unwrap();
    assert_eq!(flow.state(), SessionState::Created);

    flow.submit(&collector).await.unwrap();
    assert_eq!(flow.state(), SessionState::Submitted);

    let first = flow.fetch_result().await.unwrap();
    assert_eq!(flow.state(), SessionState::ResultAvailable);

    // Repeated reads are idempotent.
    let second = flow.fetch_result().await.unwrap();
    assert_eq!(first, second);

    flow.send_feedback(5, "insightful").await.unwrap();
    let feedback = backend.feedback();
    assert_eq!(feedback.len(), 1);
    assert_eq!(feedback[0].rating.value(), 5);
    assert_eq!(feedback[0].test_id, test.id);

    // The cross-reference is cleared once feedback was accepted.
    assert_eq!(
        app.store()
            .test_for_session(flow.session_id())
            .await
            .unwrap(),
        None
    );
}

#[tokio::test]
async fn incomplete_answers_never_reach_the_backend() {
    let app = app_with(seeded_backend());
    let test_id = TestId::new(1);

    let questions = app.catalog().load_questions(test_id).await.unwrap();
    let mut collector = AnswerCollector::new(questions).unwrap();
    collector
        .set_answer(QuestionId::new(1), AnswerValue::Agree)
        .unwrap();
    collector
        .set_answer(QuestionId::new(2), AnswerValue::Agree)
        .unwrap();

    let flow = app.start_session(test_id).await.unwrap();
    let err = flow.submit(&collector).await.unwrap_err();
    assert!(matches!(
        err,
        FlowError::Incomplete {
            answered: 2,
            total: 3
        }
    ));

    // The session was never submitted, so there is no result to fetch.
    assert_eq!(flow.state(), SessionState::Created);
    let err = flow.fetch_result().await.unwrap_err();
    assert!(matches!(err, FlowError::NotSubmitted));
}

#[tokio::test]
async fn result_for_unsubmitted_session_is_a_service_error() {
    let backend = seeded_backend();
    let app = app_with(backend.clone());
    let flow = app.start_session(TestId::new(1)).await.unwrap();

    let err = backend.fetch_result(flow.session_id()).await.unwrap_err();
    assert!(matches!(err, ApiError::Service { .. }));
}

#[tokio::test]
async fn failed_submit_leaves_the_session_retryable() {
    let backend = seeded_backend();
    let app = app_with(backend.clone());

    let collector = answered_collector(&app, TestId::new(1)).await;
    let flow = app.start_session(TestId::new(1)).await.unwrap();

    backend.fail_next_complete();
    let err = flow.submit(&collector).await.unwrap_err();
    assert!(matches!(err, FlowError::Api(ApiError::Service { .. })));
    assert_eq!(flow.state(), SessionState::Created);

    // Same session id, user-initiated retry.
    flow.submit(&collector).await.unwrap();
    assert_eq!(flow.state(), SessionState::Submitted);
}

#[tokio::test]
async fn second_sequential_submit_is_refused() {
    let app = app_with(seeded_backend());
    let collector = answered_collector(&app, TestId::new(1)).await;
    let flow = app.start_session(TestId::new(1)).await.unwrap();

    flow.submit(&collector).await.unwrap();
    let err = flow.submit(&collector).await.unwrap_err();
    assert!(matches!(err, FlowError::AlreadySubmitted));
}

/// Delegating backend whose `complete_session` parks until released, so a
/// test can observe the in-flight window.
struct GatedBackend {
    inner: InMemoryBackend,
    entered: Arc<Notify>,
    release: Arc<Notify>,
}

#[async_trait]
impl TestBackend for GatedBackend {
    async fn list_tests(&self) -> Result<Vec<Test>, ApiError> {
        self.inner.list_tests().await
    }

    async fn questions_for_test(&self, test_id: TestId) -> Result<Vec<Question>, ApiError> {
        self.inner.questions_for_test(test_id).await
    }

    async fn create_session(&self, test_id: TestId) -> Result<Session, ApiError> {
        self.inner.create_session(test_id).await
    }

    async fn complete_session(
        &self,
        session_id: SessionId,
        answers: &services::AnswerMap,
    ) -> Result<(), ApiError> {
        self.entered.notify_one();
        self.release.notified().await;
        self.inner.complete_session(session_id, answers).await
    }

    async fn fetch_result(&self, session_id: SessionId) -> Result<TestResult, ApiError> {
        self.inner.fetch_result(session_id).await
    }

    async fn send_feedback(&self, feedback: &Feedback) -> Result<(), ApiError> {
        self.inner.send_feedback(feedback).await
    }

    async fn fetch_profile(&self) -> Result<User, ApiError> {
        self.inner.fetch_profile().await
    }

    async fn history_for_user(&self, user_id: u64) -> Result<Vec<TestHistoryEntry>, ApiError> {
        self.inner.history_for_user(user_id).await
    }
}

#[tokio::test]
async fn reentrant_submit_is_rejected_while_one_is_in_flight() {
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let backend = GatedBackend {
        inner: seeded_backend(),
        entered: Arc::clone(&entered),
        release: Arc::clone(&release),
    };

    let app = AppServices::new(
        Arc::new(backend),
        Arc::new(InMemoryStore::with_token("tok")),
    );
    let collector = Arc::new(answered_collector(&app, TestId::new(1)).await);
    let flow = Arc::new(app.start_session(TestId::new(1)).await.unwrap());

    let first = {
        let flow = Arc::clone(&flow);
        let collector = Arc::clone(&collector);
        tokio::spawn(async move { flow.submit(&collector).await })
    };

    // Wait until the first submit is parked inside the backend call.
    entered.notified().await;
    let err = flow.submit(&collector).await.unwrap_err();
    assert!(matches!(err, FlowError::SubmitInFlight));

    release.notify_one();
    first.await.unwrap().unwrap();
    assert_eq!(flow.state(), SessionState::Submitted);
}

#[tokio::test]
async fn resumed_session_fetches_result_and_feedback_by_id_alone() {
    let backend = seeded_backend();
    let store: Arc<dyn ClientStore> = Arc::new(InMemoryStore::with_token("tok"));
    let app = AppServices::new(Arc::new(backend.clone()), Arc::clone(&store));

    let collector = answered_collector(&app, TestId::new(1)).await;
    let flow = app.start_session(TestId::new(1)).await.unwrap();
    flow.submit(&collector).await.unwrap();
    let session_id = flow.session_id();
    drop(flow);

    // Fresh page load: only the session id survives, in the URL.
    let resumed = app.resume_session(session_id);
    let result = resumed.fetch_result().await.unwrap();
    assert!(!result.result.is_empty());

    resumed.send_feedback(4, "solid").await.unwrap();
    assert_eq!(backend.feedback().len(), 1);
}

#[tokio::test]
async fn feedback_without_cross_reference_is_refused() {
    let app = app_with(seeded_backend());

    // Resume a session this store has never seen.
    let resumed = app.resume_session(SessionId::new(777));
    let err = resumed.send_feedback(3, "fine").await.unwrap_err();
    assert!(matches!(err, FlowError::UnknownSessionTest));
}

#[tokio::test]
async fn invalid_feedback_is_rejected_before_the_backend_sees_it() {
    let backend = seeded_backend();
    let app = app_with(backend.clone());

    let collector = answered_collector(&app, TestId::new(1)).await;
    let flow = app.start_session(TestId::new(1)).await.unwrap();
    flow.submit(&collector).await.unwrap();

    let err = flow.send_feedback(0, "meh").await.unwrap_err();
    assert!(matches!(err, FlowError::Feedback(_)));

    let err = flow.send_feedback(3, "   ").await.unwrap_err();
    assert!(matches!(err, FlowError::Feedback(_)));

    assert!(backend.feedback().is_empty());
}

#[tokio::test]
async fn test_history_is_looked_up_through_the_profile() {
    let backend = seeded_backend();
    backend.set_profile(User {
        id: 42,
        name: "An Nguyen".to_string(),
        email: "an@example.com".to_string(),
        role: Role::Student,
    });
    backend.add_history(
        42,
        vec![TestHistoryEntry {
            session_id: SessionId::new(5),
            test_title: "MBTI Test".to_string(),
            result: "INTP".to_string(),
            completed_at: None,
        }],
    );

    let app = app_with(backend);
    let user = app.current_user().await.unwrap();
    assert_eq!(user.role, Role::Student);

    let history = app.test_history().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].test_title, "MBTI Test");
}
