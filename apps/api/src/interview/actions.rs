//! Boundary between callers and the flows.
//!
//! A generation failure never reaches the caller: it is logged and replaced by a
//! fixed fallback of the same shape. Validation errors are returned as-is.

use chrono::Utc;
use tracing::{error, info};

use crate::errors::AppError;
use crate::interview::flows::{
    generate_answer, generate_feedback, generate_questions, FlowError, GenerationFailure,
};
use crate::interview::schemas::{
    AnswerGenerationInput, AnswerGenerationOutput, FeedbackGenerationInput,
    FeedbackGenerationOutput, QuestionGenerationInput, QuestionGenerationOutput, ValidationError,
};
use crate::interview::transcript::flatten_transcript;
use crate::llm_client::LlmProvider;
use crate::sessions::models::{InterviewFeedback, SessionEvaluation};
use crate::sessions::repository::SessionRepository;
use crate::sessions::store::StoreError;

pub const FALLBACK_QUESTIONS: [&str; 5] = [
    "Tell me about a challenging project you worked on.",
    "Explain a complex technical concept to a non-technical person.",
    "How do you handle disagreements with your team members?",
    "Where do you see yourself in 5 years?",
    "What are your salary expectations?",
];

/// Used when an experience level was never recorded with the session.
const UNSPECIFIED_LEVEL: &str = "Not specified";

pub fn fallback_questions() -> QuestionGenerationOutput {
    QuestionGenerationOutput {
        questions: FALLBACK_QUESTIONS.iter().map(|q| q.to_string()).collect(),
    }
}

/// Supportive mid-range evaluation.
pub fn fallback_feedback() -> FeedbackGenerationOutput {
    FeedbackGenerationOutput {
        score: 5.0,
        strengths: "Good effort on the interview. You showed a willingness to tackle tough \
                    questions."
            .to_string(),
        weaknesses: "Some answers could have been more structured. It seems there are some gaps \
                     in foundational knowledge in certain areas."
            .to_string(),
        communication_analysis: Some(
            "Communication was generally clear, but sometimes you seemed unsure. Try to project \
             more confidence in your answers."
                .to_string(),
        ),
        improvement_tips: "1. Review the fundamentals of your specialty. 2. Practice explaining \
                           your thought process out loud. 3. Use the STAR method for behavioral \
                           questions."
            .to_string(),
    }
}

pub fn fallback_answer() -> AnswerGenerationOutput {
    AnswerGenerationOutput {
        answer: "Start with one concrete example from your own experience that matches the \
                 question. Describe the situation and your task, walk through the actions you \
                 personally took, and finish with a measurable result and what you learned."
            .to_string(),
        key_points: vec![
            "Tie the example to a requirement in the job description.".to_string(),
            "Explain your own decisions, not only the team's.".to_string(),
            "Close with an outcome you can quantify.".to_string(),
        ],
        delivery_tips: "Keep it to about two minutes, pause before answering, and check whether \
                        the interviewer wants more detail."
            .to_string(),
    }
}

/// Splits a flow result: output passes through, validation is the caller's
/// problem, and a generation failure is logged and replaced.
fn absorb<T>(
    capability: &str,
    result: Result<T, FlowError>,
    fallback: fn() -> T,
) -> Result<T, ValidationError> {
    match result {
        Ok(output) => Ok(output),
        Err(FlowError::Validation(e)) => Err(e),
        Err(FlowError::Generation(e)) => {
            log_failure(capability, &e);
            Ok(fallback())
        }
    }
}

fn log_failure(capability: &str, failure: &GenerationFailure) {
    error!("Error generating {capability}: {failure}; returning fallback");
}

pub async fn get_interview_questions_action(
    llm: &dyn LlmProvider,
    input: &QuestionGenerationInput,
) -> Result<QuestionGenerationOutput, ValidationError> {
    absorb(
        "interview questions",
        generate_questions(llm, input).await,
        fallback_questions,
    )
}

pub async fn get_interview_answer_action(
    llm: &dyn LlmProvider,
    input: &AnswerGenerationInput,
) -> Result<AnswerGenerationOutput, ValidationError> {
    absorb(
        "interview answer",
        generate_answer(llm, input).await,
        fallback_answer,
    )
}

pub async fn get_personalized_feedback_action(
    llm: &dyn LlmProvider,
    input: &FeedbackGenerationInput,
) -> Result<FeedbackGenerationOutput, ValidationError> {
    absorb(
        "personalized feedback",
        generate_feedback(llm, input).await,
        fallback_feedback,
    )
}

/// Evaluates a saved session once and back-fills its score.
///
/// An already evaluated session is returned without calling the model. A fallback
/// evaluation is returned but not stored, so a later call can still obtain a real one.
pub async fn evaluate_session_action(
    llm: &dyn LlmProvider,
    sessions: &SessionRepository,
    session_id: &str,
) -> Result<InterviewFeedback, AppError> {
    let not_found = || AppError::NotFound(format!("Session {session_id} not found"));

    let feedback = sessions.get_feedback(session_id).await?.ok_or_else(not_found)?;
    if feedback.is_evaluated() {
        info!("Session {session_id} already evaluated");
        return Ok(feedback);
    }
    let session = sessions.get_session(session_id).await?.ok_or_else(not_found)?;

    let input = FeedbackGenerationInput {
        interview_transcript: flatten_transcript(&feedback.transcript),
        user_role: session.role.clone(),
        experience_level: session
            .experience_level
            .clone()
            .unwrap_or_else(|| UNSPECIFIED_LEVEL.to_string()),
        technical_specialty: session.specialty.clone(),
        target_company: session.target_company.clone(),
    };

    match generate_feedback(llm, &input).await {
        Ok(result) => match sessions.record_evaluation(session_id, result).await {
            // Lost a race with a concurrent evaluation; the stored one wins.
            Err(AppError::Persistence(StoreError::Duplicate(_))) => sessions
                .get_feedback(session_id)
                .await?
                .ok_or_else(not_found),
            other => other,
        },
        Err(FlowError::Validation(e)) => Err(e.into()),
        Err(FlowError::Generation(e)) => {
            log_failure("session evaluation", &e);
            Ok(feedback.with_evaluation(&SessionEvaluation {
                session_id: session_id.to_string(),
                evaluated_at: Utc::now(),
                result: fallback_feedback(),
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use serde_json::json;

    use crate::interview::transcript::TranscriptItem;
    use crate::llm_client::testing::ScriptedLlm;
    use crate::llm_client::LlmError;
    use crate::sessions::store::MemoryStore;

    fn backend_config() -> QuestionGenerationInput {
        QuestionGenerationInput {
            role: "Backend Engineer".to_string(),
            experience_level: "Mid-level".to_string(),
            specialty: "Node.js".to_string(),
            topic: "APIs".to_string(),
            target_company: None,
        }
    }

    fn answer_input(job_description: &str) -> AnswerGenerationInput {
        AnswerGenerationInput {
            job_description: job_description.to_string(),
            interview_question: "Tell me about a time you scaled a service.".to_string(),
            experience_level: "Senior".to_string(),
        }
    }

    fn feedback_input() -> FeedbackGenerationInput {
        FeedbackGenerationInput {
            interview_transcript: "Q: What is REST?\nA: Resources and verbs.".to_string(),
            user_role: "Backend Engineer".to_string(),
            experience_level: "Mid-level".to_string(),
            technical_specialty: "Node.js".to_string(),
            target_company: None,
        }
    }

    fn feedback_reply(score: f64) -> serde_json::Value {
        json!({
            "score": score,
            "strengths": "Precise definitions",
            "weaknesses": "No examples",
            "communicationAnalysis": "Calm and clear",
            "improvementTips": "1. Bring examples."
        })
    }

    async fn saved_session(repo: &SessionRepository) -> String {
        repo.save_session(
            &backend_config(),
            vec![
                TranscriptItem::question("What is REST?", 1),
                TranscriptItem::answer("Resources and verbs.", 2),
            ],
        )
        .await
        .unwrap()
    }

    fn repo() -> SessionRepository {
        SessionRepository::new(Arc::new(MemoryStore::new()), Utc::now())
    }

    #[tokio::test]
    async fn test_backend_engineer_questions_fall_back_on_llm_failure() {
        let llm = ScriptedLlm::failing();

        let output = get_interview_questions_action(&llm, &backend_config())
            .await
            .unwrap();

        assert_eq!(output.questions, FALLBACK_QUESTIONS);
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_question_fallback_is_deterministic() {
        let llm = ScriptedLlm::failing();
        let first = get_interview_questions_action(&llm, &backend_config())
            .await
            .unwrap();
        let second = get_interview_questions_action(&llm, &backend_config())
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_generated_questions_pass_through() {
        let llm = ScriptedLlm::new(vec![Ok(json!({
            "questions": ["How do you paginate a REST collection?"]
        }))]);

        let output = get_interview_questions_action(&llm, &backend_config())
            .await
            .unwrap();

        assert_eq!(output.questions, vec!["How do you paginate a REST collection?"]);
    }

    #[tokio::test]
    async fn test_invalid_configuration_is_not_masked() {
        let llm = ScriptedLlm::failing();
        let mut config = backend_config();
        config.topic = " ".to_string();

        let err = get_interview_questions_action(&llm, &config)
            .await
            .unwrap_err();

        assert_eq!(err.field, "topic");
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_short_job_description_rejected_before_llm_call() {
        let llm = ScriptedLlm::failing();

        let err = get_interview_answer_action(&llm, &answer_input("Too short"))
            .await
            .unwrap_err();

        assert_eq!(err.field, "jobDescription");
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_answer_falls_back_on_llm_failure() {
        let llm = ScriptedLlm::new(vec![Err(LlmError::RateLimited { attempts: 3 })]);
        let jd = "We are hiring a senior backend engineer to own our payments platform end to end.";

        let output = get_interview_answer_action(&llm, &answer_input(jd))
            .await
            .unwrap();

        assert_eq!(output, fallback_answer());
    }

    #[tokio::test]
    async fn test_feedback_fallback_is_supportive_and_in_range() {
        let llm = ScriptedLlm::failing();

        let output = get_personalized_feedback_action(&llm, &feedback_input())
            .await
            .unwrap();

        assert_eq!(output.score, 5.0);
        assert!(output.communication_analysis.is_some());
        assert_eq!(output, fallback_feedback());
    }

    #[tokio::test]
    async fn test_out_of_range_score_is_replaced_by_fallback() {
        let llm = ScriptedLlm::new(vec![Ok(feedback_reply(11.0))]);

        let output = get_personalized_feedback_action(&llm, &feedback_input())
            .await
            .unwrap();

        assert!((1.0..=10.0).contains(&output.score));
        assert_eq!(output.score, 5.0);
    }

    #[tokio::test]
    async fn test_evaluate_session_persists_result() {
        let repo = repo();
        let id = saved_session(&repo).await;
        let llm = ScriptedLlm::new(vec![Ok(feedback_reply(8.0))]);

        let feedback = evaluate_session_action(&llm, &repo, &id).await.unwrap();

        assert_eq!(feedback.score, Some(8.0));
        assert_eq!(feedback.strengths, "Precise definitions");
        let prompt = llm.last_request().unwrap().prompt;
        assert!(prompt.contains("Q: What is REST?\nA: Resources and verbs."));
        assert_eq!(repo.get_session(&id).await.unwrap().unwrap().score, Some(8.0));
    }

    #[tokio::test]
    async fn test_evaluated_session_skips_llm() {
        let repo = repo();
        let id = saved_session(&repo).await;
        let llm = ScriptedLlm::new(vec![Ok(feedback_reply(8.0))]);
        evaluate_session_action(&llm, &repo, &id).await.unwrap();

        let again = evaluate_session_action(&llm, &repo, &id).await.unwrap();

        assert_eq!(again.score, Some(8.0));
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_evaluation_fallback_is_not_persisted() {
        let repo = repo();
        let id = saved_session(&repo).await;

        let fallback = evaluate_session_action(&ScriptedLlm::failing(), &repo, &id)
            .await
            .unwrap();
        assert_eq!(fallback.score, Some(5.0));
        assert!(repo.get_session(&id).await.unwrap().unwrap().score.is_none());

        let llm = ScriptedLlm::new(vec![Ok(feedback_reply(7.0))]);
        let real = evaluate_session_action(&llm, &repo, &id).await.unwrap();
        assert_eq!(real.score, Some(7.0));
    }

    #[tokio::test]
    async fn test_evaluate_unknown_session_is_not_found() {
        let llm = ScriptedLlm::failing();
        let err = evaluate_session_action(&llm, &repo(), "session-404")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_seed_session_is_already_evaluated() {
        let llm = ScriptedLlm::failing();
        let feedback = evaluate_session_action(&llm, &repo(), "session-3")
            .await
            .unwrap();
        assert_eq!(feedback.score, Some(9.0));
        assert_eq!(llm.calls(), 0);
    }
}
