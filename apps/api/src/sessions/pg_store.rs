use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::info;

use crate::interview::schemas::FeedbackGenerationOutput;
use crate::sessions::models::{InterviewFeedback, InterviewSession, SessionEvaluation};
use crate::sessions::store::{SessionStore, StoreError};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS interview_sessions (
        id               TEXT PRIMARY KEY,
        role             TEXT NOT NULL,
        specialty        TEXT NOT NULL,
        date             TIMESTAMPTZ NOT NULL,
        experience_level TEXT,
        topic            TEXT,
        target_company   TEXT,
        created_at       TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS interview_feedbacks (
        session_id TEXT PRIMARY KEY REFERENCES interview_sessions (id),
        record     JSONB NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS interview_evaluations (
        session_id   TEXT PRIMARY KEY,
        evaluated_at TIMESTAMPTZ NOT NULL,
        result       JSONB NOT NULL
    )
    "#,
];

#[derive(Debug, FromRow)]
struct SessionRow {
    id: String,
    role: String,
    specialty: String,
    date: DateTime<Utc>,
    experience_level: Option<String>,
    topic: Option<String>,
    target_company: Option<String>,
}

impl From<SessionRow> for InterviewSession {
    fn from(row: SessionRow) -> Self {
        Self {
            id: row.id,
            role: row.role,
            specialty: row.specialty,
            date: row.date,
            score: None,
            experience_level: row.experience_level,
            topic: row.topic,
            target_company: row.target_company,
        }
    }
}

#[derive(Debug, FromRow)]
struct EvaluationRow {
    session_id: String,
    evaluated_at: DateTime<Utc>,
    result: Json<FeedbackGenerationOutput>,
}

impl From<EvaluationRow> for SessionEvaluation {
    fn from(row: EvaluationRow) -> Self {
        Self {
            session_id: row.session_id,
            evaluated_at: row.evaluated_at,
            result: row.result.0,
        }
    }
}

/// PostgreSQL backend. Append-only: every write is an INSERT, never an UPDATE.
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    /// Wraps a pool and creates the tables if they are missing.
    pub async fn open(pool: PgPool) -> Result<Self, StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }
        info!("PgSessionStore schema ready");
        Ok(Self { pool })
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn append_session(
        &self,
        session: &InterviewSession,
        feedback: &InterviewFeedback,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO interview_sessions
                (id, role, specialty, date, experience_level, topic, target_company)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&session.id)
        .bind(&session.role)
        .bind(&session.specialty)
        .bind(session.date)
        .bind(&session.experience_level)
        .bind(&session.topic)
        .bind(&session.target_company)
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            return Err(StoreError::Duplicate(format!("session {}", session.id)));
        }

        sqlx::query("INSERT INTO interview_feedbacks (session_id, record) VALUES ($1, $2)")
            .bind(&feedback.session_id)
            .bind(Json(feedback))
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn load_sessions(&self) -> Result<Vec<InterviewSession>, StoreError> {
        let rows = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT id, role, specialty, date, experience_level, topic, target_company
            FROM interview_sessions
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(InterviewSession::from).collect())
    }

    async fn load_feedback(
        &self,
        session_id: &str,
    ) -> Result<Option<InterviewFeedback>, StoreError> {
        let record: Option<Json<InterviewFeedback>> =
            sqlx::query_scalar("SELECT record FROM interview_feedbacks WHERE session_id = $1")
                .bind(session_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(record.map(|r| r.0))
    }

    async fn append_evaluation(&self, evaluation: &SessionEvaluation) -> Result<(), StoreError> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO interview_evaluations (session_id, evaluated_at, result)
            VALUES ($1, $2, $3)
            ON CONFLICT (session_id) DO NOTHING
            "#,
        )
        .bind(&evaluation.session_id)
        .bind(evaluation.evaluated_at)
        .bind(Json(&evaluation.result))
        .execute(&self.pool)
        .await?;

        if inserted.rows_affected() == 0 {
            return Err(StoreError::Duplicate(format!(
                "evaluation for {}",
                evaluation.session_id
            )));
        }
        Ok(())
    }

    async fn load_evaluations(&self) -> Result<Vec<SessionEvaluation>, StoreError> {
        let rows = sqlx::query_as::<_, EvaluationRow>(
            "SELECT session_id, evaluated_at, result FROM interview_evaluations",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(SessionEvaluation::from).collect())
    }

    async fn load_evaluation(
        &self,
        session_id: &str,
    ) -> Result<Option<SessionEvaluation>, StoreError> {
        let row = sqlx::query_as::<_, EvaluationRow>(
            "SELECT session_id, evaluated_at, result FROM interview_evaluations WHERE session_id = $1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(SessionEvaluation::from))
    }

    async fn close(&self) -> Result<(), StoreError> {
        self.pool.close().await;
        info!("PostgreSQL pool closed");
        Ok(())
    }
}
