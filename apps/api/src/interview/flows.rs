//! Flow functions, one per capability.
//!
//! Flow: validate input, render prompt, `llm_client::invoke`, return validated output.
//! Flows never fabricate output and never persist anything; substituting a
//! fallback is the job of interview::actions.

use thiserror::Error;
use tracing::info;

use crate::interview::prompts::{
    answer_template, feedback_template, questions_template, ANSWER_SYSTEM, ANSWER_TEMPERATURE,
    FEEDBACK_SYSTEM, FEEDBACK_TEMPERATURE, QUESTIONS_SYSTEM, QUESTIONS_TEMPERATURE,
    QUESTION_COUNT,
};
use crate::interview::schemas::{
    AnswerGenerationInput, AnswerGenerationOutput, FeedbackGenerationInput,
    FeedbackGenerationOutput, QuestionGenerationInput, QuestionGenerationOutput, Validate,
    ValidationError,
};
use crate::interview::template::{TemplateError, TemplateVars};
use crate::llm_client::{invoke, GenerationParams, LlmError, LlmProvider};

/// No usable output was produced.
#[derive(Debug, Error)]
pub enum GenerationFailure {
    #[error("prompt rendering failed: {0}")]
    Prompt(#[from] TemplateError),

    #[error("{0}")]
    Llm(#[from] LlmError),
}

/// The two outcomes a flow can fail with: fix your input, or the model did not cooperate.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("generation failed: {0}")]
    Generation(#[from] GenerationFailure),
}

/// Generates an ordered interview question set for a configuration.
pub async fn generate_questions(
    llm: &dyn LlmProvider,
    input: &QuestionGenerationInput,
) -> Result<QuestionGenerationOutput, FlowError> {
    input.validate()?;

    let vars = TemplateVars::new()
        .set("question_count", QUESTION_COUNT.to_string())
        .set("experience_level", input.experience_level.trim())
        .set("role", input.role.trim())
        .set("specialty", input.specialty.trim())
        .set("topic", input.topic.trim())
        .set_opt("target_company", input.target_company());
    let prompt = questions_template()
        .and_then(|template| template.render(&vars))
        .map_err(GenerationFailure::from)?;

    info!(
        "Generating questions: role={} specialty={} topic={}",
        input.role, input.specialty, input.topic
    );
    let output: QuestionGenerationOutput = invoke(
        llm,
        QUESTIONS_SYSTEM,
        prompt,
        GenerationParams::with_temperature(QUESTIONS_TEMPERATURE),
    )
    .await
    .map_err(GenerationFailure::from)?;

    info!("Generated {} questions", output.questions.len());
    Ok(output)
}

/// Drafts a tailored answer to one interview question.
pub async fn generate_answer(
    llm: &dyn LlmProvider,
    input: &AnswerGenerationInput,
) -> Result<AnswerGenerationOutput, FlowError> {
    input.validate()?;

    let vars = TemplateVars::new()
        .set("experience_level", input.experience_level.trim())
        .set("job_description", input.job_description.as_str())
        .set("interview_question", input.interview_question.trim());
    let prompt = answer_template()
        .and_then(|template| template.render(&vars))
        .map_err(GenerationFailure::from)?;

    info!(
        "Generating answer for question: {:?}",
        input.interview_question.chars().take(60).collect::<String>()
    );
    let output: AnswerGenerationOutput = invoke(
        llm,
        ANSWER_SYSTEM,
        prompt,
        GenerationParams::with_temperature(ANSWER_TEMPERATURE),
    )
    .await
    .map_err(GenerationFailure::from)?;

    info!("Generated answer with {} key points", output.key_points.len());
    Ok(output)
}

/// Evaluates a flattened transcript.
pub async fn generate_feedback(
    llm: &dyn LlmProvider,
    input: &FeedbackGenerationInput,
) -> Result<FeedbackGenerationOutput, FlowError> {
    input.validate()?;

    let vars = TemplateVars::new()
        .set("experience_level", input.experience_level.trim())
        .set("user_role", input.user_role.trim())
        .set("technical_specialty", input.technical_specialty.trim())
        .set("interview_transcript", input.interview_transcript.as_str())
        .set_opt("target_company", input.target_company());
    let prompt = feedback_template()
        .and_then(|template| template.render(&vars))
        .map_err(GenerationFailure::from)?;

    info!(
        "Generating feedback: role={} specialty={} transcript_chars={}",
        input.user_role,
        input.technical_specialty,
        input.interview_transcript.len()
    );
    let output: FeedbackGenerationOutput = invoke(
        llm,
        FEEDBACK_SYSTEM,
        prompt,
        GenerationParams::with_temperature(FEEDBACK_TEMPERATURE),
    )
    .await
    .map_err(GenerationFailure::from)?;

    info!("Generated feedback: score={}", output.score);
    Ok(output)
}
