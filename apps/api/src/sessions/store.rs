//! Session Store: pluggable, append-only persistence for sessions, feedback
//! shells and evaluations.
//!
//! Backends: `JsonFileStore` (default), `PgSessionStore`, `MemoryStore`.
//! `AppState` reaches the store through `SessionRepository`, which holds an
//! `Arc<dyn SessionStore>` chosen at startup via `STORE_BACKEND`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::sessions::models::{InterviewFeedback, InterviewSession, SessionEvaluation};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("bucket '{bucket}' is corrupt: {source}")]
    Corrupt {
        bucket: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("{0} already exists")]
    Duplicate(String),

    #[error("store is closed")]
    Closed,
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolClosed => StoreError::Closed,
            other => StoreError::Database(other),
        }
    }
}

/// The storage trait. Implement this to add a backend without touching the
/// repository, actions or handlers.
///
/// There are no update or delete operations.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Appends a session and its feedback shell as one unit.
    async fn append_session(
        &self,
        session: &InterviewSession,
        feedback: &InterviewFeedback,
    ) -> Result<(), StoreError>;

    async fn load_sessions(&self) -> Result<Vec<InterviewSession>, StoreError>;

    async fn load_feedback(&self, session_id: &str)
        -> Result<Option<InterviewFeedback>, StoreError>;

    /// Write-once: fails with `Duplicate` if the session already has an evaluation.
    async fn append_evaluation(&self, evaluation: &SessionEvaluation) -> Result<(), StoreError>;

    async fn load_evaluations(&self) -> Result<Vec<SessionEvaluation>, StoreError>;

    async fn load_evaluation(
        &self,
        session_id: &str,
    ) -> Result<Option<SessionEvaluation>, StoreError>;

    /// Flushes and releases the backend. Later calls fail with `Closed`.
    async fn close(&self) -> Result<(), StoreError>;
}

/// The three named buckets, as held in memory by the file and memory backends.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Buckets {
    pub sessions: Vec<InterviewSession>,
    pub feedbacks: BTreeMap<String, InterviewFeedback>,
    pub evaluations: BTreeMap<String, SessionEvaluation>,
}

impl Buckets {
    pub fn push_session(
        &mut self,
        session: &InterviewSession,
        feedback: &InterviewFeedback,
    ) -> Result<(), StoreError> {
        if self.sessions.iter().any(|s| s.id == session.id) {
            return Err(StoreError::Duplicate(format!("session {}", session.id)));
        }
        self.sessions.push(session.clone());
        self.feedbacks
            .insert(feedback.session_id.clone(), feedback.clone());
        Ok(())
    }

    pub fn push_evaluation(&mut self, evaluation: &SessionEvaluation) -> Result<(), StoreError> {
        if self.evaluations.contains_key(&evaluation.session_id) {
            return Err(StoreError::Duplicate(format!(
                "evaluation for {}",
                evaluation.session_id
            )));
        }
        self.evaluations
            .insert(evaluation.session_id.clone(), evaluation.clone());
        Ok(())
    }
}

/// Process-local store. Used by tests and `STORE_BACKEND=memory`.
///
/// `None` once closed.
#[derive(Debug)]
pub struct MemoryStore {
    buckets: RwLock<Option<Buckets>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            buckets: RwLock::new(Some(Buckets::default())),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn append_session(
        &self,
        session: &InterviewSession,
        feedback: &InterviewFeedback,
    ) -> Result<(), StoreError> {
        self.buckets
            .write()
            .await
            .as_mut()
            .ok_or(StoreError::Closed)?
            .push_session(session, feedback)
    }

    async fn load_sessions(&self) -> Result<Vec<InterviewSession>, StoreError> {
        let guard = self.buckets.read().await;
        Ok(guard.as_ref().ok_or(StoreError::Closed)?.sessions.clone())
    }

    async fn load_feedback(
        &self,
        session_id: &str,
    ) -> Result<Option<InterviewFeedback>, StoreError> {
        let guard = self.buckets.read().await;
        Ok(guard
            .as_ref()
            .ok_or(StoreError::Closed)?
            .feedbacks
            .get(session_id)
            .cloned())
    }

    async fn append_evaluation(&self, evaluation: &SessionEvaluation) -> Result<(), StoreError> {
        self.buckets
            .write()
            .await
            .as_mut()
            .ok_or(StoreError::Closed)?
            .push_evaluation(evaluation)
    }

    async fn load_evaluations(&self) -> Result<Vec<SessionEvaluation>, StoreError> {
        let guard = self.buckets.read().await;
        Ok(guard
            .as_ref()
            .ok_or(StoreError::Closed)?
            .evaluations
            .values()
            .cloned()
            .collect())
    }

    async fn load_evaluation(
        &self,
        session_id: &str,
    ) -> Result<Option<SessionEvaluation>, StoreError> {
        let guard = self.buckets.read().await;
        Ok(guard
            .as_ref()
            .ok_or(StoreError::Closed)?
            .evaluations
            .get(session_id)
            .cloned())
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.buckets.write().await.take();
        Ok(())
    }
}
