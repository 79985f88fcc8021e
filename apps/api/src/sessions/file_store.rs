use std::io::{self, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::sessions::models::{InterviewFeedback, InterviewSession, SessionEvaluation};
use crate::sessions::store::{Buckets, SessionStore, StoreError};

const SESSIONS_BUCKET: &str = "sessions";
const FEEDBACKS_BUCKET: &str = "feedbacks";
const EVALUATIONS_BUCKET: &str = "evaluations";

/// Stores each bucket as one JSON file in a directory.
///
/// Buckets are loaded at `open` and kept in memory; every append rewrites the
/// touched bucket through a temp file and rename, so a crash never leaves a
/// half-written bucket behind.
pub struct JsonFileStore {
    dir: PathBuf,
    state: Mutex<Option<Buckets>>,
}

impl JsonFileStore {
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;

        let buckets = Buckets {
            sessions: read_bucket(&dir, SESSIONS_BUCKET).await?.unwrap_or_default(),
            feedbacks: read_bucket(&dir, FEEDBACKS_BUCKET).await?.unwrap_or_default(),
            evaluations: read_bucket(&dir, EVALUATIONS_BUCKET)
                .await?
                .unwrap_or_default(),
        };

        info!(
            "JsonFileStore opened at {} ({} sessions, {} evaluations)",
            dir.display(),
            buckets.sessions.len(),
            buckets.evaluations.len()
        );

        Ok(Self {
            dir,
            state: Mutex::new(Some(buckets)),
        })
    }
}

fn bucket_path(dir: &Path, bucket: &str) -> PathBuf {
    dir.join(format!("{bucket}.json"))
}

async fn read_bucket<T: DeserializeOwned>(
    dir: &Path,
    bucket: &'static str,
) -> Result<Option<T>, StoreError> {
    match tokio::fs::read(bucket_path(dir, bucket)).await {
        Ok(bytes) => serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StoreError::Corrupt { bucket, source }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn write_bucket<T: Serialize>(dir: &Path, bucket: &str, value: &T) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    let dir = dir.to_path_buf();
    let path = bucket_path(&dir, bucket);

    tokio::task::spawn_blocking(move || -> io::Result<()> {
        let mut tmp = NamedTempFile::new_in(&dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| e.error)?;
        Ok(())
    })
    .await
    .map_err(|e| io::Error::new(io::ErrorKind::Other, e))??;

    debug!("Flushed bucket '{bucket}'");
    Ok(())
}

#[async_trait]
impl SessionStore for JsonFileStore {
    async fn append_session(
        &self,
        session: &InterviewSession,
        feedback: &InterviewFeedback,
    ) -> Result<(), StoreError> {
        let mut guard = self.state.lock().await;
        let current = guard.as_ref().ok_or(StoreError::Closed)?;

        let mut next = current.clone();
        next.push_session(session, feedback)?;

        // Feedback first: a failure between the two writes leaves an unreachable
        // shell rather than a listed session without a transcript.
        write_bucket(&self.dir, FEEDBACKS_BUCKET, &next.feedbacks).await?;
        write_bucket(&self.dir, SESSIONS_BUCKET, &next.sessions).await?;

        *guard = Some(next);
        Ok(())
    }

    async fn load_sessions(&self) -> Result<Vec<InterviewSession>, StoreError> {
        let guard = self.state.lock().await;
        Ok(guard.as_ref().ok_or(StoreError::Closed)?.sessions.clone())
    }

    async fn load_feedback(
        &self,
        session_id: &str,
    ) -> Result<Option<InterviewFeedback>, StoreError> {
        let guard = self.state.lock().await;
        Ok(guard
            .as_ref()
            .ok_or(StoreError::Closed)?
            .feedbacks
            .get(session_id)
            .cloned())
    }

    async fn append_evaluation(&self, evaluation: &SessionEvaluation) -> Result<(), StoreError> {
        let mut guard = self.state.lock().await;
        let current = guard.as_ref().ok_or(StoreError::Closed)?;

        let mut next = current.clone();
        next.push_evaluation(evaluation)?;
        write_bucket(&self.dir, EVALUATIONS_BUCKET, &next.evaluations).await?;

        *guard = Some(next);
        Ok(())
    }

    async fn load_evaluations(&self) -> Result<Vec<SessionEvaluation>, StoreError> {
        let guard = self.state.lock().await;
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
        let guard = self.state.lock().await;
        Ok(guard
            .as_ref()
            .ok_or(StoreError::Closed)?
            .evaluations
            .get(session_id)
            .cloned())
    }

    async fn close(&self) -> Result<(), StoreError> {
        let mut guard = self.state.lock().await;
        if let Some(buckets) = guard.take() {
            write_bucket(&self.dir, SESSIONS_BUCKET, &buckets.sessions).await?;
            write_bucket(&self.dir, FEEDBACKS_BUCKET, &buckets.feedbacks).await?;
            write_bucket(&self.dir, EVALUATIONS_BUCKET, &buckets.evaluations).await?;
            info!("JsonFileStore at {} closed", self.dir.display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::Utc;

    use crate::interview::schemas::FeedbackGenerationOutput;
    use crate::interview::transcript::TranscriptItem;

    fn session(id: &str) -> InterviewSession {
        InterviewSession {
            id: id.to_string(),
            role: "Platform Engineer".to_string(),
            specialty: "Kubernetes".to_string(),
            date: Utc::now(),
            score: None,
            experience_level: Some("Senior".to_string()),
            topic: Some("Networking".to_string()),
            target_company: None,
        }
    }

    fn shell(session_id: &str) -> InterviewFeedback {
        InterviewFeedback::shell(
            format!("feedback-{session_id}"),
            session_id.to_string(),
            vec![
                TranscriptItem::question("What is a Service?", 1),
                TranscriptItem::answer("A stable virtual IP in front of pods.", 2),
            ],
        )
    }

    #[tokio::test]
    async fn test_records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let store = JsonFileStore::open(dir.path()).await.unwrap();
        store.append_session(&session("s1"), &shell("s1")).await.unwrap();
        store
            .append_evaluation(&SessionEvaluation {
                session_id: "s1".to_string(),
                evaluated_at: Utc::now(),
                result: FeedbackGenerationOutput {
                    score: 8.0,
                    strengths: "s".to_string(),
                    weaknesses: "w".to_string(),
                    communication_analysis: Some("c".to_string()),
                    improvement_tips: "1. t".to_string(),
                },
            })
            .await
            .unwrap();
        store.close().await.unwrap();

        let reopened = JsonFileStore::open(dir.path()).await.unwrap();
        let sessions = reopened.load_sessions().await.unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, "s1");
        let feedback = reopened.load_feedback("s1").await.unwrap().unwrap();
        assert_eq!(feedback.transcript, shell("s1").transcript);
        let evaluation = reopened.load_evaluation("s1").await.unwrap().unwrap();
        assert_eq!(evaluation.result.score, 8.0);
    }

    #[tokio::test]
    async fn test_each_append_is_flushed_without_close() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();
        store.append_session(&session("s1"), &shell("s1")).await.unwrap();

        let raw = std::fs::read_to_string(dir.path().join("sessions.json")).unwrap();
        let parsed: Vec<InterviewSession> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed[0].role, "Platform Engineer");
        assert!(dir.path().join("feedbacks.json").exists());
    }

    #[tokio::test]
    async fn test_corrupt_bucket_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sessions.json"), "{not json").unwrap();

        let err = JsonFileStore::open(dir.path()).await.err().unwrap();

        assert!(matches!(err, StoreError::Corrupt { bucket: "sessions", .. }));
    }

    #[tokio::test]
    async fn test_closed_store_refuses_calls() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();
        store.close().await.unwrap();

        assert!(matches!(
            store.load_sessions().await.unwrap_err(),
            StoreError::Closed
        ));
        // Closing twice is harmless.
        store.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_duplicate_append_leaves_state_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();
        store.append_session(&session("s1"), &shell("s1")).await.unwrap();
        assert!(store.append_session(&session("s1"), &shell("s1")).await.is_err());
        assert_eq!(store.load_sessions().await.unwrap().len(), 1);
    }
}
