//! Axum route handlers for the Sessions API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppJson};
use crate::interview::actions::evaluate_session_action;
use crate::interview::schemas::InterviewConfiguration;
use crate::interview::transcript::{transcript_from_answers, TranscriptItem};
use crate::sessions::models::{InterviewFeedback, InterviewSession};
use crate::sessions::stats::{recent_sessions, SessionStats};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

/// The dialogue of a finished interview, either as a ready transcript or as the
/// question set plus one answer per question.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RecordedInterview {
    Transcript {
        transcript: Vec<TranscriptItem>,
    },
    Answers {
        questions: Vec<String>,
        answers: Vec<String>,
    },
}

#[derive(Debug, Deserialize)]
pub struct SaveSessionRequest {
    pub config: InterviewConfiguration,
    #[serde(flatten)]
    pub interview: RecordedInterview,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSessionResponse {
    pub session_id: String,
}

/// GET /api/v1/sessions
/// Newest first; `?limit=n` keeps the first n.
pub async fn handle_list_sessions(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<InterviewSession>>, AppError> {
    let sessions = state.sessions.get_sessions().await?;
    let limit = params.limit.unwrap_or(usize::MAX);
    Ok(Json(recent_sessions(sessions, limit)))
}

/// POST /api/v1/sessions
pub async fn handle_save_session(
    State(state): State<AppState>,
    AppJson(req): AppJson<SaveSessionRequest>,
) -> Result<(StatusCode, Json<SaveSessionResponse>), AppError> {
    let transcript = match req.interview {
        RecordedInterview::Transcript { transcript } => transcript,
        RecordedInterview::Answers { questions, answers } => {
            transcript_from_answers(questions, answers, Utc::now().timestamp_millis())?
        }
    };
    let session_id = state.sessions.save_session(&req.config, transcript).await?;
    Ok((StatusCode::CREATED, Json(SaveSessionResponse { session_id })))
}

/// GET /api/v1/sessions/stats
pub async fn handle_stats(State(state): State<AppState>) -> Result<Json<SessionStats>, AppError> {
    let sessions = state.sessions.get_sessions().await?;
    Ok(Json(SessionStats::from_sessions(&sessions)))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<InterviewSession>, AppError> {
    let session = state
        .sessions
        .get_session(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?;
    Ok(Json(session))
}

/// GET /api/v1/sessions/:id/feedback
pub async fn handle_get_feedback(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<InterviewFeedback>, AppError> {
    let feedback = state
        .sessions
        .get_feedback(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Feedback for session {id} not found")))?;
    Ok(Json(feedback))
}

/// POST /api/v1/sessions/:id/evaluate
pub async fn handle_evaluate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<InterviewFeedback>, AppError> {
    let feedback = evaluate_session_action(state.llm.as_ref(), &state.sessions, &id).await?;
    Ok(Json(feedback))
}
