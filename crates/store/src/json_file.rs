use async_trait::async_trait;
use persona_core::{SessionId, TestId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::store::{ClientStore, StoreError};

/// Persisted shape of the client store.
///
/// Session map keys are the raw session id values so the document stays a
/// plain JSON object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoreDocument {
    token: Option<String>,
    #[serde(default)]
    sessions: HashMap<u64, u64>,
}

/// File-backed store, the cross-page-load analog of browser local storage.
///
/// The whole document is rewritten on every mutation; state is tiny (one
/// token plus a handful of session cross-references), so this stays cheap.
pub struct JsonFileStore {
    path: PathBuf,
    state: Mutex<StoreDocument>,
}

impl JsonFileStore {
    /// Open a store at `path`, loading existing state if the file exists.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Backend` if the file exists but cannot be read
    /// or parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let state = match std::fs::read_to_string(&path) {
            Ok(raw) => {
                serde_json::from_str(&raw).map_err(|e| StoreError::Backend(e.to_string()))?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoreDocument::default(),
            Err(e) => return Err(StoreError::Backend(e.to_string())),
        };

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    fn persist(path: &Path, state: &StoreDocument) -> Result<(), StoreError> {
        let raw =
            serde_json::to_string_pretty(state).map_err(|e| StoreError::Backend(e.to_string()))?;

        // Write-then-rename so a crash mid-write cannot leave a torn document.
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, raw).map_err(|e| StoreError::Backend(e.to_string()))?;
        std::fs::rename(&tmp, path).map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }

    fn mutate<F>(&self, apply: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut StoreDocument),
    {
        let mut guard = self
            .state
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        apply(&mut guard);
        Self::persist(&self.path, &guard)
    }
}

#[async_trait]
impl ClientStore for JsonFileStore {
    async fn token(&self) -> Result<Option<String>, StoreError> {
        let guard = self
            .state
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(guard.token.clone())
    }

    async fn set_token(&self, token: &str) -> Result<(), StoreError> {
        self.mutate(|state| state.token = Some(token.to_string()))
    }

    async fn clear_token(&self) -> Result<(), StoreError> {
        self.mutate(|state| state.token = None)
    }

    async fn remember_session(
        &self,
        session_id: SessionId,
        test_id: TestId,
    ) -> Result<(), StoreError> {
        self.mutate(|state| {
            state.sessions.insert(session_id.value(), test_id.value());
        })
    }

    async fn test_for_session(
        &self,
        session_id: SessionId,
    ) -> Result<Option<TestId>, StoreError> {
        let guard = self
            .state
            .lock()
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(guard
            .sessions
            .get(&session_id.value())
            .copied()
            .map(TestId::new))
    }

    async fn forget_session(&self, session_id: SessionId) -> Result<(), StoreError> {
        self.mutate(|state| {
            state.sessions.remove(&session_id.value());
        })
    }
}
