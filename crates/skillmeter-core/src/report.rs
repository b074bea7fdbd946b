//! Final-score report for a finished (or abandoned) session.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::{AssessmentSession, TerminationReason};

/// Format a countdown value as `m:ss`.
pub fn format_time(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// How a session run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum RunOutcome {
    /// The session reached `Finished`.
    Finished(TerminationReason),
    /// The presentation went away while the session was still running.
    Abandoned,
}

impl std::fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunOutcome::Finished(reason) => write!(f, "finished ({reason})"),
            RunOutcome::Abandoned => write!(f, "abandoned"),
        }
    }
}

/// A complete session report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// The session this report describes.
    pub session_id: Uuid,
    pub bank: BankSummary,
    pub outcome: RunOutcome,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_secs: u32,
    pub remaining_seconds: u32,
    pub score: usize,
    pub total: usize,
    /// One row per answered question, in answer order.
    pub answers: Vec<AnswerRow>,
}

/// Summary of a question bank (without the questions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankSummary {
    pub id: String,
    pub name: String,
    pub question_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRow {
    /// 1-based question number.
    pub number: usize,
    pub prompt: String,
    /// The chosen option text, `None` when the index was out of range.
    pub selected: Option<String>,
    pub expected: String,
    pub correct: bool,
    /// Seconds into the session when the answer was registered.
    pub answered_after_secs: u32,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Per-topic tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagTally {
    pub answered: usize,
    pub correct: usize,
}

impl SessionReport {
    /// Build a report from a session's current state.
    pub fn from_session(
        session: &AssessmentSession,
        outcome: RunOutcome,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        let bank = session.bank();
        let duration_secs = session.config().duration_secs;

        let answers = session
            .answers()
            .iter()
            .filter_map(|record| {
                let question = bank.get(record.question_index)?;
                Some(AnswerRow {
                    number: record.question_index + 1,
                    prompt: question.prompt().to_string(),
                    selected: question.options().get(record.selected_index).cloned(),
                    expected: question.options()[question.correct_index()].clone(),
                    correct: record.correct,
                    answered_after_secs: duration_secs.saturating_sub(record.remaining_seconds),
                    tags: question.tags().to_vec(),
                })
            })
            .collect();

        Self {
            id: Uuid::new_v4(),
            session_id: session.id(),
            bank: BankSummary {
                id: bank.id.clone(),
                name: bank.name.clone(),
                question_count: bank.len(),
            },
            outcome,
            started_at,
            finished_at,
            duration_secs,
            remaining_seconds: session.remaining_seconds(),
            score: session.score(),
            total: bank.len(),
            answers,
        }
    }

    /// Seconds of the countdown that were used.
    pub fn elapsed_secs(&self) -> u32 {
        self.duration_secs.saturating_sub(self.remaining_seconds)
    }

    pub fn answered(&self) -> usize {
        self.answers.len()
    }

    /// "Score: 2 of 3"
    pub fn score_line(&self) -> String {
        format!("Score: {} of {}", self.score, self.total)
    }

    /// Score as a fraction of the whole bank, in `0.0..=1.0`.
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.score as f64 / self.total as f64
    }

    /// Correct/answered counts grouped by question tag.
    pub fn by_tag(&self) -> BTreeMap<String, TagTally> {
        let mut tallies: BTreeMap<String, TagTally> = BTreeMap::new();
        for row in &self.answers {
            for tag in &row.tags {
                let tally = tallies.entry(tag.clone()).or_default();
                tally.answered += 1;
                if row.correct {
                    tally.correct += 1;
                }
            }
        }
        tallies
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
