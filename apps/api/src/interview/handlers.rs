//! Axum route handlers for the Interview API.

use axum::{extract::State, Json};

use crate::errors::{AppError, AppJson};
use crate::interview::actions::{
    get_interview_answer_action, get_interview_questions_action, get_personalized_feedback_action,
};
use crate::interview::schemas::{
    AnswerGenerationInput, AnswerGenerationOutput, FeedbackGenerationInput,
    FeedbackGenerationOutput, InterviewConfiguration, QuestionGenerationOutput,
};
use crate::state::AppState;

/// POST /api/v1/interview/questions
pub async fn handle_questions(
    State(state): State<AppState>,
    AppJson(config): AppJson<InterviewConfiguration>,
) -> Result<Json<QuestionGenerationOutput>, AppError> {
    let output = get_interview_questions_action(state.llm.as_ref(), &config).await?;
    Ok(Json(output))
}

/// POST /api/v1/interview/answer
pub async fn handle_answer(
    State(state): State<AppState>,
    AppJson(req): AppJson<AnswerGenerationInput>,
) -> Result<Json<AnswerGenerationOutput>, AppError> {
    let output = get_interview_answer_action(state.llm.as_ref(), &req).await?;
    Ok(Json(output))
}

/// POST /api/v1/interview/feedback
pub async fn handle_feedback(
    State(state): State<AppState>,
    AppJson(req): AppJson<FeedbackGenerationInput>,
) -> Result<Json<FeedbackGenerationOutput>, AppError> {
    let output = get_personalized_feedback_action(state.llm.as_ref(), &req).await?;
    Ok(Json(output))
}
