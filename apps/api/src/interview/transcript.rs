//! Interview transcripts: question/answer items in the order they happened.

use serde::{Deserialize, Serialize};

use crate::interview::schemas::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptItemKind {
    Question,
    Answer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptItem {
    #[serde(rename = "type")]
    pub kind: TranscriptItemKind,
    pub content: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

impl TranscriptItem {
    pub fn question(content: impl Into<String>, timestamp: i64) -> Self {
        Self {
            kind: TranscriptItemKind::Question,
            content: content.into(),
            timestamp,
        }
    }

    pub fn answer(content: impl Into<String>, timestamp: i64) -> Self {
        Self {
            kind: TranscriptItemKind::Answer,
            content: content.into(),
            timestamp,
        }
    }
}

/// Renders the dialogue as `Q: ...` / `A: ...` lines for the feedback prompt.
pub fn flatten_transcript(items: &[TranscriptItem]) -> String {
    items
        .iter()
        .map(|item| match item.kind {
            TranscriptItemKind::Question => format!("Q: {}", item.content),
            TranscriptItemKind::Answer => format!("A: {}", item.content),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A transcript must be one or more question/answer pairs, in that order.
pub fn check_alternation(items: &[TranscriptItem]) -> Result<(), ValidationError> {
    if items.is_empty() {
        return Err(ValidationError::new(
            "transcript",
            "must contain at least one question/answer pair",
        ));
    }
    if items.len() % 2 != 0 {
        return Err(ValidationError::new(
            "transcript",
            "every question must be followed by an answer",
        ));
    }
    for (i, item) in items.iter().enumerate() {
        let expected = if i % 2 == 0 {
            TranscriptItemKind::Question
        } else {
            TranscriptItemKind::Answer
        };
        if item.kind != expected {
            return Err(ValidationError::new(
                "transcript",
                format!("item {i} should be a {expected:?} but is a {:?}", item.kind),
            ));
        }
    }
    Ok(())
}

/// Walks a fixed question set and records one question item and one answer item
/// per question.
#[derive(Debug, Clone)]
pub struct InterviewRecorder {
    questions: Vec<String>,
    current: usize,
    transcript: Vec<TranscriptItem>,
}

impl InterviewRecorder {
    pub fn new(questions: Vec<String>) -> Self {
        Self {
            questions,
            current: 0,
            transcript: Vec::new(),
        }
    }

    pub fn current_question(&self) -> Option<&str> {
        self.questions.get(self.current).map(String::as_str)
    }

    pub fn is_finished(&self) -> bool {
        self.current >= self.questions.len()
    }

    /// Records the current question and its answer, then moves to the next question.
    /// Empty answers are kept: a skipped question is still part of the dialogue.
    pub fn record_answer(
        &mut self,
        answer: impl Into<String>,
        timestamp: i64,
    ) -> Result<(), ValidationError> {
        let question = self
            .current_question()
            .ok_or_else(|| ValidationError::new("answer", "all questions have been answered"))?
            .to_string();
        self.transcript.push(TranscriptItem::question(question, timestamp));
        self.transcript.push(TranscriptItem::answer(answer, timestamp));
        self.current += 1;
        Ok(())
    }

    pub fn into_transcript(self) -> Vec<TranscriptItem> {
        self.transcript
    }
}

/// Replays a finished interview through an `InterviewRecorder`.
///
/// Every question needs an answer (an empty one counts). Items are stamped
/// `started_at`, `started_at + 1`, ... so their order survives sorting.
pub fn transcript_from_answers(
    questions: Vec<String>,
    answers: Vec<String>,
    started_at: i64,
) -> Result<Vec<TranscriptItem>, ValidationError> {
    let question_count = questions.len();
    let mut recorder = InterviewRecorder::new(questions);

    for (i, answer) in answers.into_iter().enumerate() {
        recorder.record_answer(answer, started_at + i as i64)?;
    }

    if !recorder.is_finished() {
        return Err(ValidationError::new(
            "answers",
            format!("expected {question_count} answers, one per question"),
        ));
    }
    Ok(recorder.into_transcript())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_serializes_with_type_field() {
        let item = TranscriptItem::question("What is a closure?", 1_700_000_000_000);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["type"], "question");
        assert_eq!(json["content"], "What is a closure?");
        assert_eq!(json["timestamp"], 1_700_000_000_000_i64);
    }

    #[test]
    fn test_flatten_prefixes_each_line() {
        let items = vec![
            TranscriptItem::question("What is REST?", 1),
            TranscriptItem::answer("An architectural style.", 2),
        ];
        assert_eq!(
            flatten_transcript(&items),
            "Q: What is REST?\nA: An architectural style."
        );
    }

    #[test]
    fn test_alternation_accepts_pairs() {
        let items = vec![
            TranscriptItem::question("q1", 1),
            TranscriptItem::answer("a1", 2),
            TranscriptItem::question("q2", 3),
            TranscriptItem::answer("", 4),
        ];
        assert!(check_alternation(&items).is_ok());
    }

    #[test]
    fn test_alternation_rejects_empty_odd_and_swapped() {
        assert!(check_alternation(&[]).is_err());
        assert!(check_alternation(&[TranscriptItem::question("q", 1)]).is_err());
        let swapped = vec![TranscriptItem::answer("a", 1), TranscriptItem::question("q", 2)];
        let err = check_alternation(&swapped).unwrap_err();
        assert!(err.reason.contains("item 0"));
    }

    #[test]
    fn test_recorder_walks_questions_in_order() {
        let mut recorder = InterviewRecorder::new(vec![
            "q1".to_string(),
            "q2".to_string(),
            "q3".to_string(),
        ]);

        for (i, answer) in ["a1", "a2", "a3"].iter().enumerate() {
            assert_eq!(recorder.current_question(), Some(format!("q{}", i + 1).as_str()));
            recorder.record_answer(*answer, i as i64).unwrap();
        }

        assert!(recorder.is_finished());
        assert!(recorder.record_answer("late", 9).is_err());

        let transcript = recorder.into_transcript();
        assert_eq!(transcript.len(), 6);
        let kinds: Vec<_> = transcript.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TranscriptItemKind::Question,
                TranscriptItemKind::Answer,
                TranscriptItemKind::Question,
                TranscriptItemKind::Answer,
                TranscriptItemKind::Question,
                TranscriptItemKind::Answer,
            ]
        );
        assert!(check_alternation(&transcript).is_ok());
    }

    #[test]
    fn test_transcript_from_answers_pairs_in_order() {
        let transcript = transcript_from_answers(
            vec!["What is a mutex?".to_string(), "What is a deadlock?".to_string()],
            vec!["A lock.".to_string(), String::new()],
            1_000,
        )
        .unwrap();

        assert_eq!(
            transcript,
            vec![
                TranscriptItem::question("What is a mutex?", 1_000),
                TranscriptItem::answer("A lock.", 1_000),
                TranscriptItem::question("What is a deadlock?", 1_001),
                TranscriptItem::answer("", 1_001),
            ]
        );
    }

    #[test]
    fn test_transcript_from_answers_rejects_count_mismatch() {
        let missing = transcript_from_answers(
            vec!["q1".to_string(), "q2".to_string()],
            vec!["a1".to_string()],
            0,
        )
        .unwrap_err();
        assert_eq!(missing.field, "answers");

        let extra = transcript_from_answers(
            vec!["q1".to_string()],
            vec!["a1".to_string(), "a2".to_string()],
            0,
        )
        .unwrap_err();
        assert_eq!(extra.field, "answer");
    }
}
