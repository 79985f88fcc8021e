use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::interview::schemas::{FeedbackGenerationOutput, InterviewConfiguration};
use crate::interview::transcript::TranscriptItem;

/// Current `InterviewFeedback` schema. Version 1 records predate
/// `communicationAnalysis` and carry no version field.
pub const FEEDBACK_SCHEMA_VERSION: u32 = 2;

fn legacy_schema_version() -> u32 {
    1
}

/// One completed interview attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewSession {
    pub id: String,
    pub role: String,
    pub specialty: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_company: Option<String>,
}

impl InterviewSession {
    pub fn from_config(id: String, config: &InterviewConfiguration, date: DateTime<Utc>) -> Self {
        Self {
            id,
            role: config.role.clone(),
            specialty: config.specialty.clone(),
            date,
            score: None,
            experience_level: Some(config.experience_level.clone()),
            topic: Some(config.topic.clone()),
            target_company: config.target_company().map(str::to_string),
        }
    }
}

/// Evaluation of one session plus its transcript. Keyed by `session_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewFeedback {
    pub id: String,
    pub session_id: String,
    #[serde(default)]
    pub score: Option<f64>,
    pub strengths: String,
    pub weaknesses: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub communication_analysis: Option<String>,
    pub improvement_tips: String,
    pub transcript: Vec<TranscriptItem>,
    #[serde(default = "legacy_schema_version")]
    pub schema_version: u32,
}

impl InterviewFeedback {
    /// A feedback record with the transcript but no evaluation yet.
    pub fn shell(id: String, session_id: String, transcript: Vec<TranscriptItem>) -> Self {
        Self {
            id,
            session_id,
            score: None,
            strengths: String::new(),
            weaknesses: String::new(),
            communication_analysis: None,
            improvement_tips: String::new(),
            transcript,
            schema_version: FEEDBACK_SCHEMA_VERSION,
        }
    }

    pub fn is_evaluated(&self) -> bool {
        self.score.is_some()
    }

    /// Brings an older record up to the current schema. Version 1 differs only by
    /// the missing `communicationAnalysis`, which is already optional.
    pub fn migrate(mut self) -> Self {
        if self.schema_version < FEEDBACK_SCHEMA_VERSION {
            self.schema_version = FEEDBACK_SCHEMA_VERSION;
        }
        self
    }

    /// Copies the evaluative fields of `evaluation` over this record.
    pub fn with_evaluation(mut self, evaluation: &SessionEvaluation) -> Self {
        let result = &evaluation.result;
        self.score = Some(result.score);
        self.strengths = result.strengths.clone();
        self.weaknesses = result.weaknesses.clone();
        self.communication_analysis = result.communication_analysis.clone();
        self.improvement_tips = result.improvement_tips.clone();
        self
    }
}

/// The stored LLM evaluation of one session. Written once, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEvaluation {
    pub session_id: String,
    pub evaluated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub result: FeedbackGenerationOutput,
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::interview::transcript::TranscriptItem;

    fn evaluation() -> SessionEvaluation {
        SessionEvaluation {
            session_id: "session-1".to_string(),
            evaluated_at: Utc::now(),
            result: FeedbackGenerationOutput {
                score: 7.0,
                strengths: "Good structure".to_string(),
                weaknesses: "Light on testing".to_string(),
                communication_analysis: Some("Confident".to_string()),
                improvement_tips: "1. Write more tests.".to_string(),
            },
        }
    }

    #[test]
    fn test_session_from_config_drops_blank_company() {
        let config = InterviewConfiguration {
            role: "Data Scientist".to_string(),
            experience_level: "Junior".to_string(),
            specialty: "Python".to_string(),
            topic: "Pandas".to_string(),
            target_company: Some("".to_string()),
        };
        let session = InterviewSession::from_config("session-9".to_string(), &config, Utc::now());
        assert_eq!(session.role, "Data Scientist");
        assert_eq!(session.score, None);
        assert_eq!(session.target_company, None);
        assert_eq!(session.topic.as_deref(), Some("Pandas"));
    }

    #[test]
    fn test_session_json_uses_iso_date_and_camel_case() {
        let json = r#"{"id":"session-2","role":"Backend Engineer","specialty":"Node.js","date":"2024-05-01T10:00:00.000Z","score":6}"#;
        let session: InterviewSession = serde_json::from_str(json).unwrap();
        assert_eq!(session.score, Some(6.0));
        assert!(session.experience_level.is_none());

        let back = serde_json::to_value(&session).unwrap();
        assert!(back["date"].as_str().unwrap().starts_with("2024-05-01T10:00:00"));
        assert!(back.get("experienceLevel").is_none());
    }

    #[test]
    fn test_legacy_feedback_migrates() {
        let json = r#"{
            "id": "feedback-1", "sessionId": "session-1", "score": 8,
            "strengths": "s", "weaknesses": "w", "improvementTips": "1. t",
            "transcript": [{"type": "question", "content": "q", "timestamp": 1}]
        }"#;
        let feedback: InterviewFeedback = serde_json::from_str(json).unwrap();
        assert_eq!(feedback.schema_version, 1);
        let migrated = feedback.migrate();
        assert_eq!(migrated.schema_version, FEEDBACK_SCHEMA_VERSION);
        assert!(migrated.communication_analysis.is_none());
    }

    #[test]
    fn test_shell_is_not_evaluated_until_overlay() {
        let shell = InterviewFeedback::shell(
            "feedback-1".to_string(),
            "session-1".to_string(),
            vec![TranscriptItem::question("q", 1), TranscriptItem::answer("a", 2)],
        );
        assert!(!shell.is_evaluated());
        assert!(shell.strengths.is_empty());

        let merged = shell.with_evaluation(&evaluation());
        assert!(merged.is_evaluated());
        assert_eq!(merged.score, Some(7.0));
        assert_eq!(merged.communication_analysis.as_deref(), Some("Confident"));
        assert_eq!(merged.transcript.len(), 2);
    }

    #[test]
    fn test_evaluation_serializes_flat() {
        let json = serde_json::to_value(evaluation()).unwrap();
        assert_eq!(json["sessionId"], "session-1");
        assert_eq!(json["score"], 7.0);
        assert_eq!(json["improvementTips"], "1. Write more tests.");
    }
}
