use async_trait::async_trait;
use persona_core::{SessionId, TestId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by client store backends.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    #[error("not found")]
    NotFound,

    #[error("store backend error: {0}")]
    Backend(String),
}

/// Contract for the injected client-side store.
///
/// The token is opaque to everything in this workspace; it is whatever the
/// login flow put there. The session cross-reference exists because the
/// result payload does not carry a test id, yet the feedback step needs one.
#[async_trait]
pub trait ClientStore: Send + Sync {
    /// Current bearer token, if a user is logged in.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend cannot be read.
    async fn token(&self) -> Result<Option<String>, StoreError>;

    /// Store the bearer token at login.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend cannot be written.
    async fn set_token(&self, token: &str) -> Result<(), StoreError>;

    /// Drop the bearer token at logout.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend cannot be written.
    async fn clear_token(&self) -> Result<(), StoreError>;

    /// Record which test a session belongs to, at session start.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend cannot be written.
    async fn remember_session(
        &self,
        session_id: SessionId,
        test_id: TestId,
    ) -> Result<(), StoreError>;

    /// Look up the test a session belongs to.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend cannot be read.
    async fn test_for_session(&self, session_id: SessionId)
    -> Result<Option<TestId>, StoreError>;

    /// Drop the cross-reference once feedback has been submitted.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backend cannot be written.
    async fn forget_session(&self, session_id: SessionId) -> Result<(), StoreError>;
}

/// Simple in-memory store for tests and single-page lifetimes.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    token: Arc<Mutex<Option<String>>>,
    sessions: Arc<Mutex<HashMap<SessionId, TestId>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor for a store that already holds a token.
    #[must_use]
    pub fn with_token(token: &str) -> Self {
        let store = Self::new();
        match store.token.lock() {
            Ok(mut guard) => *guard = Some(token.to_string()),
            Err(poisoned) => *poisoned.into_inner() = Some(token.to_string()),
        }
        store
    }
}

#[async_trait]
impl ClientStore for InMemoryStore {
    async fn token(&self) -> Result<Option<String>, StoreError> {
        let guard = self
            .token
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn set_token(&self, token: &str) -> Result<(), StoreError> {
        let mut guard = self
            .token
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        *guard = Some(token.to_string());
        Ok(())
    }

    async fn clear_token(&self) -> Result<(), StoreError> {
        let mut guard = self
            .token
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        *guard = None;
        Ok(())
    }

    async fn remember_session(
        &self,
        session_id: SessionId,
        test_id: TestId,
    ) -> Result<(), StoreError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        guard.insert(session_id, test_id);
        Ok(())
    }

    async fn test_for_session(
        &self,
        session_id: SessionId,
    ) -> Result<Option<TestId>, StoreError> {
        let guard = self
            .sessions
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(guard.get(&session_id).copied())
    }

    async fn forget_session(&self, session_id: SessionId) -> Result<(), StoreError> {
        let mut guard = self
            .sessions
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        guard.remove(&session_id);
        Ok(())
    }
}
