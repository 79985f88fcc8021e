//! Built-in sessions shown alongside the user's own history.

use chrono::{DateTime, Duration, Utc};

use crate::interview::transcript::TranscriptItem;
use crate::sessions::models::{InterviewFeedback, InterviewSession, FEEDBACK_SCHEMA_VERSION};

/// Seed sessions and their evaluated feedback, dated relative to `now`.
#[derive(Debug, Clone)]
pub struct SeedData {
    pub sessions: Vec<InterviewSession>,
    pub feedbacks: Vec<InterviewFeedback>,
}

impl SeedData {
    pub fn at(now: DateTime<Utc>) -> Self {
        let ms = now.timestamp_millis();
        let session = |id: &str, role: &str, specialty: &str, days_ago: i64, score: f64| {
            InterviewSession {
                id: id.to_string(),
                role: role.to_string(),
                specialty: specialty.to_string(),
                date: now - Duration::days(days_ago),
                score: Some(score),
                experience_level: None,
                topic: None,
                target_company: None,
            }
        };

        let sessions = vec![
            session("session-1", "Frontend Engineer", "React", 0, 8.0),
            session("session-2", "Backend Engineer", "Node.js", 1, 6.0),
            session("session-3", "Data Scientist", "Python", 2, 9.0),
        ];

        let feedbacks = vec![
            InterviewFeedback {
                id: "feedback-1".to_string(),
                session_id: "session-1".to_string(),
                score: Some(8.0),
                strengths: "Strong problem solving and clear explanations. The walkthrough of \
                    the React rendering cycle was accurate and complete."
                    .to_string(),
                weaknesses: "State management for large applications was only touched on, and \
                    the testing answer stayed generic."
                    .to_string(),
                communication_analysis: None,
                improvement_tips: "1. Study Redux Toolkit or Zustand for large-scale state. \
                    2. Practise writing unit and integration tests for components. \
                    3. Name the trade-offs when you justify a technical choice."
                    .to_string(),
                transcript: vec![
                    TranscriptItem::question("Can you explain the virtual DOM in React?", ms - 100_000),
                    TranscriptItem::answer(
                        "React keeps an in-memory representation of the UI and reconciles it \
                         with the real DOM, applying only the differences.",
                        ms - 80_000,
                    ),
                    TranscriptItem::question("What are React Hooks?", ms - 60_000),
                    TranscriptItem::answer(
                        "Functions that let function components use state and lifecycle \
                         features without writing a class.",
                        ms - 30_000,
                    ),
                ],
                schema_version: FEEDBACK_SCHEMA_VERSION,
            },
            InterviewFeedback {
                id: "feedback-2".to_string(),
                session_id: "session-2".to_string(),
                score: Some(6.0),
                strengths: "Solid grasp of REST principles and clean async/await code."
                    .to_string(),
                weaknesses: "The schema design for the complex scenario was shaky, and the \
                    system design answer showed gaps around scalability."
                    .to_string(),
                communication_analysis: None,
                improvement_tips: "1. Review database normalization. \
                    2. Study common patterns for scaling web services. \
                    3. Practise explaining architecture decisions step by step."
                    .to_string(),
                transcript: vec![
                    TranscriptItem::question(
                        "How would you handle authentication in a Node.js application?",
                        ms - 100_000,
                    ),
                    TranscriptItem::answer(
                        "Issue a signed JWT at login and have the client send it in the \
                         Authorization header on later requests.",
                        ms - 80_000,
                    ),
                ],
                schema_version: FEEDBACK_SCHEMA_VERSION,
            },
            InterviewFeedback {
                id: "feedback-3".to_string(),
                session_id: "session-3".to_string(),
                score: Some(9.0),
                strengths: "Deep knowledge of ML algorithms and statistics. The data processing \
                    code was efficient and well documented."
                    .to_string(),
                weaknesses: "Explanations of complex models ran long, and deployment/MLOps \
                    answers were hesitant."
                    .to_string(),
                communication_analysis: None,
                improvement_tips: "1. Structure answers with the STAR method. \
                    2. Learn the common MLOps tools and workflows. \
                    3. Prepare one-minute and five-minute versions of your key projects."
                    .to_string(),
                transcript: vec![
                    TranscriptItem::question(
                        "What is the difference between classification and regression?",
                        ms - 100_000,
                    ),
                    TranscriptItem::answer(
                        "Classification predicts a discrete label such as spam or not spam; \
                         regression predicts a continuous quantity such as a house price.",
                        ms - 80_000,
                    ),
                ],
                schema_version: FEEDBACK_SCHEMA_VERSION,
            },
        ];

        Self {
            sessions,
            feedbacks,
        }
    }

    pub fn session(&self, id: &str) -> Option<&InterviewSession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn feedback(&self, session_id: &str) -> Option<&InterviewFeedback> {
        self.feedbacks.iter().find(|f| f.session_id == session_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::interview::transcript::check_alternation;

    #[test]
    fn test_seed_has_three_dated_sessions() {
        let now = Utc::now();
        let seed = SeedData::at(now);
        assert_eq!(seed.sessions.len(), 3);
        assert_eq!(seed.session("session-1").unwrap().date, now);
        assert_eq!(
            seed.session("session-3").unwrap().date,
            now - Duration::days(2)
        );
    }

    #[test]
    fn test_every_seed_session_has_valid_feedback() {
        let seed = SeedData::at(Utc::now());
        for session in &seed.sessions {
            let feedback = seed.feedback(&session.id).unwrap();
            assert_eq!(feedback.score, session.score);
            assert!(check_alternation(&feedback.transcript).is_ok());
        }
    }
}
