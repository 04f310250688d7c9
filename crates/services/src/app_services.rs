use std::sync::Arc;

use client_store::ClientStore;
use persona_core::{SessionId, TestHistoryEntry, TestId, User};

use crate::catalog::CatalogService;
use crate::error::{ApiError, FlowError};
use crate::gateway::{ApiConfig, HttpGateway, TestBackend};
use crate::sessions::SessionFlow;

/// Assembles the front-end facing services around one backend and one store.
#[derive(Clone)]
pub struct AppServices {
    backend: Arc<dyn TestBackend>,
    store: Arc<dyn ClientStore>,
    catalog: CatalogService,
}

impl AppServices {
    /// Wire services over any backend, real or in-memory.
    #[must_use]
    pub fn new(backend: Arc<dyn TestBackend>, store: Arc<dyn ClientStore>) -> Self {
        let catalog = CatalogService::new(Arc::clone(&backend));
        Self {
            backend,
            store,
            catalog,
        }
    }

    /// Wire services over the HTTP gateway for the given config.
    #[must_use]
    pub fn http(config: ApiConfig, store: Arc<dyn ClientStore>) -> Self {
        let backend: Arc<dyn TestBackend> =
            Arc::new(HttpGateway::new(config, Arc::clone(&store)));
        Self::new(backend, store)
    }

    /// Wire services over the HTTP gateway configured from the environment.
    #[must_use]
    pub fn from_env(store: Arc<dyn ClientStore>) -> Self {
        Self::http(ApiConfig::from_env(), store)
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.catalog
    }

    #[must_use]
    pub fn backend(&self) -> Arc<dyn TestBackend> {
        Arc::clone(&self.backend)
    }

    #[must_use]
    pub fn store(&self) -> Arc<dyn ClientStore> {
        Arc::clone(&self.store)
    }

    /// Begin a new test-taking session.
    ///
    /// # Errors
    ///
    /// Returns `FlowError` if the backend refuses the session or the store
    /// cannot record the cross-reference.
    pub async fn start_session(&self, test_id: TestId) -> Result<SessionFlow, FlowError> {
        SessionFlow::start(Arc::clone(&self.backend), Arc::clone(&self.store), test_id).await
    }

    /// Rebuild the flow for an already-submitted session (fresh page load
    /// of the result view).
    #[must_use]
    pub fn resume_session(&self, session_id: SessionId) -> SessionFlow {
        SessionFlow::resume(
            Arc::clone(&self.backend),
            Arc::clone(&self.store),
            session_id,
        )
    }

    /// The authenticated user's profile.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Auth` when no one is logged in.
    pub async fn current_user(&self) -> Result<User, ApiError> {
        self.backend.fetch_profile().await
    }

    /// Completed-test history for the authenticated user.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Auth` when no one is logged in, `ApiError`
    /// otherwise.
    pub async fn test_history(&self) -> Result<Vec<TestHistoryEntry>, ApiError> {
        let user = self.backend.fetch_profile().await?;
        self.backend.history_for_user(user.id).await
    }
}
