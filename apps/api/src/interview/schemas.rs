//! Request/response contracts for the three generation capabilities.
//!
//! Inputs implement `Validate` and are checked before any LLM call. Outputs
//! implement `OutputSchema`, so a reply that does not fit is a generation failure
//! rather than a structural error leaking to the caller.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm_client::OutputSchema;

pub const MIN_ROLE_CHARS: usize = 2;
pub const MIN_TOPIC_CHARS: usize = 2;
pub const MIN_JOB_DESCRIPTION_CHARS: usize = 50;
pub const MIN_INTERVIEW_QUESTION_CHARS: usize = 10;
pub const SCORE_RANGE: RangeInclusive<f64> = 1.0..=10.0;

/// Input that does not satisfy a schema constraint. Always fixable by the caller.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

fn require_non_blank(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    Ok(())
}

fn require_min_chars(field: &'static str, value: &str, min: usize) -> Result<(), ValidationError> {
    if value.trim().chars().count() < min {
        return Err(ValidationError::new(
            field,
            format!("must be at least {min} characters"),
        ));
    }
    Ok(())
}

/// Treats a blank optional string as absent.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

// ────────────────────────────────────────────────────────────────────────────
// Question generation
// ────────────────────────────────────────────────────────────────────────────

/// What the candidate picked before starting an interview.
/// Doubles as the question-generation input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewConfiguration {
    pub role: String,
    pub experience_level: String,
    pub specialty: String,
    pub topic: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_company: Option<String>,
}

pub type QuestionGenerationInput = InterviewConfiguration;

impl InterviewConfiguration {
    pub fn target_company(&self) -> Option<&str> {
        present(&self.target_company)
    }
}

impl Validate for InterviewConfiguration {
    fn validate(&self) -> Result<(), ValidationError> {
        require_min_chars("role", &self.role, MIN_ROLE_CHARS)?;
        require_non_blank("experienceLevel", &self.experience_level)?;
        require_non_blank("specialty", &self.specialty)?;
        require_min_chars("topic", &self.topic, MIN_TOPIC_CHARS)
    }
}

/// The ordered question set for one interview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionGenerationOutput {
    pub questions: Vec<String>,
}

impl OutputSchema for QuestionGenerationOutput {
    const SHAPE: &'static str = r#"{
  "questions": [
    "Walk me through how you would design an idempotent payment endpoint."
  ]
}"#;

    fn check(&self) -> Result<(), String> {
        if self.questions.is_empty() {
            return Err("questions must not be empty".to_string());
        }
        if let Some(i) = self.questions.iter().position(|q| q.trim().is_empty()) {
            return Err(format!("questions[{i}] is blank"));
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Answer generation
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerGenerationInput {
    pub job_description: String,
    pub interview_question: String,
    pub experience_level: String,
}

impl Validate for AnswerGenerationInput {
    fn validate(&self) -> Result<(), ValidationError> {
        require_min_chars(
            "jobDescription",
            &self.job_description,
            MIN_JOB_DESCRIPTION_CHARS,
        )?;
        require_min_chars(
            "interviewQuestion",
            &self.interview_question,
            MIN_INTERVIEW_QUESTION_CHARS,
        )?;
        require_non_blank("experienceLevel", &self.experience_level)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerGenerationOutput {
    pub answer: String,
    pub key_points: Vec<String>,
    pub delivery_tips: String,
}

impl OutputSchema for AnswerGenerationOutput {
    const SHAPE: &'static str = r#"{
  "answer": "A complete answer; STAR structure (Situation, Task, Action, Result) for behavioral questions.",
  "keyPoints": ["The essential talking point to cover"],
  "deliveryTips": "How to deliver the answer: tone, pacing, confidence."
}"#;

    fn check(&self) -> Result<(), String> {
        if self.answer.trim().is_empty() {
            return Err("answer must not be empty".to_string());
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Feedback generation
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackGenerationInput {
    /// Flattened dialogue, one `Q:`/`A:` line per transcript item.
    pub interview_transcript: String,
    pub user_role: String,
    pub experience_level: String,
    pub technical_specialty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_company: Option<String>,
}

impl FeedbackGenerationInput {
    pub fn target_company(&self) -> Option<&str> {
        present(&self.target_company)
    }
}

impl Validate for FeedbackGenerationInput {
    fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("interviewTranscript", &self.interview_transcript)?;
        require_non_blank("userRole", &self.user_role)?;
        require_non_blank("experienceLevel", &self.experience_level)?;
        require_non_blank("technicalSpecialty", &self.technical_specialty)
    }
}

/// Canonical evaluation schema. `communicationAnalysis` is optional so replies and
/// stored records from the older schema without it still parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackGenerationOutput {
    pub score: f64,
    pub strengths: String,
    pub weaknesses: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub communication_analysis: Option<String>,
    /// Numbered list rendered as text: "1. ... 2. ..."
    pub improvement_tips: String,
}

impl OutputSchema for FeedbackGenerationOutput {
    const SHAPE: &'static str = r#"{
  "score": 6,
  "strengths": "What the candidate did well, with specifics.",
  "weaknesses": "Where the answers fell short, quoting the transcript.",
  "communicationAnalysis": "Clarity, structure and confidence of the delivery.",
  "improvementTips": "1. First actionable tip. 2. Second actionable tip. 3. Third actionable tip."
}"#;

    fn check(&self) -> Result<(), String> {
        if !self.score.is_finite() || !SCORE_RANGE.contains(&self.score) {
            return Err(format!(
                "score {} outside {}..={}",
                self.score,
                SCORE_RANGE.start(),
                SCORE_RANGE.end()
            ));
        }
        Ok(())
    }
}
