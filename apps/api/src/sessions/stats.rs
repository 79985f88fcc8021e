use std::collections::BTreeMap;

use serde::Serialize;

use crate::sessions::models::InterviewSession;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialtyAverage {
    pub specialty: String,
    pub sessions: usize,
    pub average_score: f64,
}

/// Aggregate view over a session history. Unscored sessions count toward
/// `total_sessions` only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub total_sessions: usize,
    pub scored_sessions: usize,
    pub average_score: Option<f64>,
    pub best_score: Option<f64>,
    pub distinct_specialties: usize,
    pub by_specialty: Vec<SpecialtyAverage>,
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

impl SessionStats {
    pub fn from_sessions(sessions: &[InterviewSession]) -> Self {
        let scores: Vec<f64> = sessions.iter().filter_map(|s| s.score).collect();

        let average_score = (!scores.is_empty())
            .then(|| round1(scores.iter().sum::<f64>() / scores.len() as f64));
        let best_score = scores.iter().copied().reduce(f64::max);

        let mut per_specialty: BTreeMap<&str, (usize, Vec<f64>)> = BTreeMap::new();
        for session in sessions {
            let entry = per_specialty.entry(session.specialty.as_str()).or_default();
            entry.0 += 1;
            if let Some(score) = session.score {
                entry.1.push(score);
            }
        }

        let distinct_specialties = per_specialty.len();
        let by_specialty = per_specialty
            .into_iter()
            .filter(|(_, (_, scores))| !scores.is_empty())
            .map(|(specialty, (count, scores))| SpecialtyAverage {
                specialty: specialty.to_string(),
                sessions: count,
                average_score: round1(scores.iter().sum::<f64>() / scores.len() as f64),
            })
            .collect();

        Self {
            total_sessions: sessions.len(),
            scored_sessions: scores.len(),
            average_score,
            best_score,
            distinct_specialties,
            by_specialty,
        }
    }
}

/// The `n` most recent sessions, newest first.
pub fn recent_sessions(mut sessions: Vec<InterviewSession>, n: usize) -> Vec<InterviewSession> {
    sessions.sort_by(|a, b| b.date.cmp(&a.date));
    sessions.truncate(n);
    sessions
}
