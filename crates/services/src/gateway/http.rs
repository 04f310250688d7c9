use std::collections::BTreeMap;
use std::env;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use client_store::ClientStore;
use persona_core::{
    Feedback, Question, QuestionId, Role, Session, SessionId, Test, TestHistoryEntry, TestId,
    TestResult, User,
};

use crate::error::ApiError;
use crate::gateway::TestBackend;
use crate::sessions::AnswerMap;

//
// ─── CONFIG ───────────────────────────────────────────────────────────────────
//

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
}

impl ApiConfig {
    /// Reads `PERSONA_API_URL`, falling back to the local dev backend.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url =
            env::var("PERSONA_API_URL").unwrap_or_else(|_| "http://localhost:8080".into());
        Self { base_url }
    }
}

//
// ─── GATEWAY ──────────────────────────────────────────────────────────────────
//

/// `TestBackend` implementation over the REST backend.
///
/// The bearer token comes from the injected client store on every call;
/// operations that require one fail with `ApiError::Auth` before any request
/// is issued.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    config: ApiConfig,
    store: Arc<dyn ClientStore>,
}

impl HttpGateway {
    #[must_use]
    pub fn new(config: ApiConfig, store: Arc<dyn ClientStore>) -> Self {
        Self {
            client: Client::new(),
            config,
            store,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    /// Attach the bearer token when one is stored; reads stay usable for
    /// anonymous visitors.
    async fn with_optional_bearer(
        &self,
        request: RequestBuilder,
    ) -> Result<RequestBuilder, ApiError> {
        match self.store.token().await? {
            Some(token) => Ok(request.bearer_auth(token)),
            None => Ok(request),
        }
    }

    /// Bearer token for operations that refuse anonymous callers.
    async fn required_token(&self) -> Result<String, ApiError> {
        self.store.token().await?.ok_or(ApiError::Auth)
    }

    /// Fold a non-2xx response into the error taxonomy, keeping the server's
    /// message text when it sent one.
    async fn error_from(response: Response) -> ApiError {
        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            return ApiError::Auth;
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return ApiError::NotFound;
        }

        let message = match response.text().await {
            Ok(body) if !body.trim().is_empty() => body,
            _ => format!("request failed with status {status}"),
        };
        warn!(status = status.as_u16(), %message, "backend request failed");
        ApiError::Service {
            status: Some(status.as_u16()),
            message,
        }
    }

    async fn ok_or_error(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::error_from(response).await)
        }
    }
}

#[async_trait]
impl TestBackend for HttpGateway {
    async fn list_tests(&self) -> Result<Vec<Test>, ApiError> {
        debug!("fetching test catalog");
        let request = self.client.get(self.endpoint("/api/test"));
        let response = self.with_optional_bearer(request).await?.send().await?;
        let wire: Vec<TestWire> = Self::ok_or_error(response).await?.json().await?;
        Ok(wire.into_iter().map(TestWire::into_test).collect())
    }

    async fn questions_for_test(&self, test_id: TestId) -> Result<Vec<Question>, ApiError> {
        debug!(%test_id, "fetching questions");
        let request = self
            .client
            .get(self.endpoint(&format!("/api/question/{test_id}")));
        let response = self.with_optional_bearer(request).await?.send().await?;
        let wire: Vec<QuestionWire> = Self::ok_or_error(response).await?.json().await?;
        Ok(wire.into_iter().map(QuestionWire::into_question).collect())
    }

    async fn create_session(&self, test_id: TestId) -> Result<Session, ApiError> {
        let token = self.required_token().await?;
        debug!(%test_id, "creating test session");

        let response = self
            .client
            .post(self.endpoint("/api/test-sessions/create"))
            .bearer_auth(token)
            .json(&CreateSessionRequest {
                test_id: test_id.value(),
            })
            .send()
            .await?;
        let wire: SessionWire = Self::ok_or_error(response).await?.json().await?;

        Ok(Session {
            id: SessionId::new(wire.id),
            test_id,
        })
    }

    async fn complete_session(
        &self,
        session_id: SessionId,
        answers: &AnswerMap,
    ) -> Result<(), ApiError> {
        let token = self.required_token().await?;
        debug!(%session_id, answers = answers.len(), "submitting answers");

        let response = self
            .client
            .post(self.endpoint(&format!("/api/test-sessions/{session_id}/complete")))
            .bearer_auth(token)
            .json(&CompleteSessionRequest::from_answers(answers))
            .send()
            .await?;
        Self::ok_or_error(response).await?;
        Ok(())
    }

    async fn fetch_result(&self, session_id: SessionId) -> Result<TestResult, ApiError> {
        let token = self.required_token().await?;
        debug!(%session_id, "fetching result");

        let response = self
            .client
            .get(self.endpoint(&format!("/api/test-sessions/{session_id}/result")))
            .bearer_auth(token)
            .send()
            .await?;
        let wire: ResultWire = Self::ok_or_error(response).await?.json().await?;
        Ok(TestResult {
            result: wire.result,
        })
    }

    async fn send_feedback(&self, feedback: &Feedback) -> Result<(), ApiError> {
        let token = self.required_token().await?;
        debug!(test_id = %feedback.test_id, "sending feedback");

        let response = self
            .client
            .post(self.endpoint("/api/feedback"))
            .bearer_auth(token)
            .json(&FeedbackRequest::from_feedback(feedback))
            .send()
            .await?;
        // The ack body is free text ("Feedback successfully"); only the
        // status matters.
        Self::ok_or_error(response).await?;
        Ok(())
    }

    async fn fetch_profile(&self) -> Result<User, ApiError> {
        let token = self.required_token().await?;
        debug!("fetching profile");

        let response = self
            .client
            .get(self.endpoint("/api/user/profile"))
            .bearer_auth(token)
            .send()
            .await?;
        let wire: UserWire = Self::ok_or_error(response).await?.json().await?;
        wire.into_user()
    }

    async fn history_for_user(&self, user_id: u64) -> Result<Vec<TestHistoryEntry>, ApiError> {
        let token = self.required_token().await?;
        debug!(user_id, "fetching test history");

        let response = self
            .client
            .get(self.endpoint(&format!("/api/test-sessions/history/{user_id}")))
            .bearer_auth(token)
            .send()
            .await?;
        let wire: Vec<HistoryWire> = Self::ok_or_error(response).await?.json().await?;
        Ok(wire.into_iter().map(HistoryWire::into_entry).collect())
    }
}

//
// ─── WIRE SHAPES ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
struct TestWire {
    id: u64,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default, rename = "createAt")]
    create_at: Option<DateTime<Utc>>,
}

impl TestWire {
    fn into_test(self) -> Test {
        Test {
            id: TestId::new(self.id),
            title: self.title,
            description: self.description,
            created_at: self.create_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct QuestionWire {
    id: u64,
    content: String,
    #[serde(rename = "testId")]
    test_id: u64,
}

impl QuestionWire {
    fn into_question(self) -> Question {
        Question::new(
            QuestionId::new(self.id),
            self.content,
            TestId::new(self.test_id),
        )
    }
}

#[derive(Debug, Serialize)]
struct CreateSessionRequest {
    #[serde(rename = "testId")]
    test_id: u64,
}

#[derive(Debug, Deserialize)]
struct SessionWire {
    id: u64,
}

#[derive(Debug, Serialize)]
struct CompleteSessionRequest {
    answers: BTreeMap<String, u8>,
}

impl CompleteSessionRequest {
    fn from_answers(answers: &AnswerMap) -> Self {
        Self {
            answers: answers
                .iter()
                .map(|(question_id, value)| (question_id.to_string(), value.to_u8()))
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ResultWire {
    result: String,
}

#[derive(Debug, Serialize)]
struct FeedbackRequest {
    rating: u8,
    #[serde(rename = "feedbackContent")]
    feedback_content: String,
    #[serde(rename = "testId")]
    test_id: u64,
}

impl FeedbackRequest {
    fn from_feedback(feedback: &Feedback) -> Self {
        Self {
            rating: feedback.rating.value(),
            feedback_content: feedback.content.clone(),
            test_id: feedback.test_id.value(),
        }
    }
}

/// The backend is inconsistent about the role shape: login responses carry
/// `{id, name}` objects while user listings carry the bare name string.
/// Both are normalized here and nowhere else.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RoleWire {
    Name(String),
    Object { name: String },
}

impl RoleWire {
    fn normalize(self) -> Result<Role, ApiError> {
        let name = match self {
            RoleWire::Name(name) => name,
            RoleWire::Object { name } => name,
        };
        Role::parse(&name).map_err(|e| ApiError::Service {
            status: None,
            message: e.to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct UserWire {
    id: u64,
    #[serde(default)]
    email: String,
    #[serde(default, alias = "fullName")]
    username: String,
    role: RoleWire,
}

impl UserWire {
    fn into_user(self) -> Result<User, ApiError> {
        Ok(User {
            id: self.id,
            name: self.username,
            email: self.email,
            role: self.role.normalize()?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct HistoryWire {
    #[serde(rename = "sessionId")]
    session_id: u64,
    #[serde(default, rename = "testTitle", alias = "title")]
    test_title: String,
    #[serde(default)]
    result: String,
    #[serde(default, rename = "completedAt")]
    completed_at: Option<DateTime<Utc>>,
}

impl HistoryWire {
    fn into_entry(self) -> TestHistoryEntry {
        TestHistoryEntry {
            session_id: SessionId::new(self.session_id),
            test_title: self.test_title,
            result: self.result,
            completed_at: self.completed_at,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
