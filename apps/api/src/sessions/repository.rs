//! Session repository: the seed dataset merged with an injected `SessionStore`.
//!
//! Reads overlay stored evaluations onto sessions and feedback shells, so the
//! records themselves are never updated.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::info;

use crate::errors::AppError;
use crate::interview::schemas::{FeedbackGenerationOutput, InterviewConfiguration, Validate};
use crate::interview::transcript::{check_alternation, TranscriptItem};
use crate::sessions::models::{InterviewFeedback, InterviewSession, SessionEvaluation};
use crate::sessions::seed::SeedData;
use crate::sessions::store::{SessionStore, StoreError};

#[derive(Clone)]
pub struct SessionRepository {
    store: Arc<dyn SessionStore>,
    seed: Arc<SeedData>,
    save_lock: Arc<Mutex<()>>,
}

impl SessionRepository {
    /// Seed dates are fixed relative to `now` for the lifetime of the repository.
    pub fn new(store: Arc<dyn SessionStore>, now: DateTime<Utc>) -> Self {
        Self {
            store,
            seed: Arc::new(SeedData::at(now)),
            save_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Persists a completed interview and returns its new session id.
    ///
    /// The session starts unscored; its feedback shell holds the full transcript.
    pub async fn save_session(
        &self,
        config: &InterviewConfiguration,
        transcript: Vec<TranscriptItem>,
    ) -> Result<String, AppError> {
        config.validate()?;
        check_alternation(&transcript)?;

        let _guard = self.save_lock.lock().await;

        let now = Utc::now();
        let taken: Vec<String> = self
            .store
            .load_sessions()
            .await?
            .into_iter()
            .map(|s| s.id)
            .chain(self.seed.sessions.iter().map(|s| s.id.clone()))
            .collect();

        let mut millis = now.timestamp_millis();
        while taken.iter().any(|id| *id == format!("session-{millis}")) {
            millis += 1;
        }
        let session_id = format!("session-{millis}");

        let session = InterviewSession::from_config(session_id.clone(), config, now);
        let feedback =
            InterviewFeedback::shell(format!("feedback-{millis}"), session_id.clone(), transcript);

        self.store.append_session(&session, &feedback).await?;

        info!(
            "Saved session {} ({} / {}, {} transcript items)",
            session_id,
            session.role,
            session.specialty,
            feedback.transcript.len()
        );
        Ok(session_id)
    }

    /// Seed sessions plus every persisted session, in no particular order.
    pub async fn get_sessions(&self) -> Result<Vec<InterviewSession>, StoreError> {
        let scores: HashMap<String, f64> = self
            .store
            .load_evaluations()
            .await?
            .into_iter()
            .map(|e| (e.session_id, e.result.score))
            .collect();

        let persisted = self.store.load_sessions().await?;
        Ok(self
            .seed
            .sessions
            .iter()
            .cloned()
            .chain(persisted.into_iter().map(|mut s| {
                if let Some(score) = scores.get(&s.id) {
                    s.score = Some(*score);
                }
                s
            }))
            .collect())
    }

    pub async fn get_session(&self, id: &str) -> Result<Option<InterviewSession>, StoreError> {
        if let Some(session) = self.seed.session(id) {
            return Ok(Some(session.clone()));
        }

        let Some(mut session) = self
            .store
            .load_sessions()
            .await?
            .into_iter()
            .find(|s| s.id == id)
        else {
            return Ok(None);
        };

        if let Some(evaluation) = self.store.load_evaluation(id).await? {
            session.score = Some(evaluation.result.score);
        }
        Ok(Some(session))
    }

    pub async fn get_feedback(
        &self,
        session_id: &str,
    ) -> Result<Option<InterviewFeedback>, StoreError> {
        if let Some(feedback) = self.seed.feedback(session_id) {
            return Ok(Some(feedback.clone()));
        }

        let Some(feedback) = self.store.load_feedback(session_id).await? else {
            return Ok(None);
        };
        let feedback = feedback.migrate();

        Ok(Some(match self.store.load_evaluation(session_id).await? {
            Some(evaluation) => feedback.with_evaluation(&evaluation),
            None => feedback,
        }))
    }

    /// Stores the evaluation of a persisted session (write-once) and returns the
    /// merged feedback.
    pub async fn record_evaluation(
        &self,
        session_id: &str,
        result: FeedbackGenerationOutput,
    ) -> Result<InterviewFeedback, AppError> {
        let feedback = self
            .store
            .load_feedback(session_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Session {session_id} not found")))?;

        let evaluation = SessionEvaluation {
            session_id: session_id.to_string(),
            evaluated_at: Utc::now(),
            result,
        };
        self.store.append_evaluation(&evaluation).await?;

        info!(
            "Recorded evaluation for {}: score={}",
            session_id, evaluation.result.score
        );
        Ok(feedback.migrate().with_evaluation(&evaluation))
    }

    pub async fn close(&self) -> Result<(), StoreError> {
        self.store.close().await
    }
}
