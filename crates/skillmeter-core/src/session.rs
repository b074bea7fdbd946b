//! The assessment state machine.
//!
//! A session is `Running` until either its clock reaches zero or every
//! question has been answered, then it is `Finished` for good. Both
//! mutating operations check both termination triggers, and both are
//! no-ops once the session has finished, so a tick and an answer racing
//! each other can never double-count.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SessionError;
use crate::model::QuestionBank;

/// Default session length in seconds.
pub const DEFAULT_DURATION_SECS: u32 = 300;

/// Session parameters fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Countdown length in seconds.
    pub duration_secs: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_secs: DEFAULT_DURATION_SECS,
        }
    }
}

/// Coarse lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Running,
    Finished,
}

/// Which trigger moved the session to `Finished`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// The countdown reached zero.
    TimeExpired,
    /// The last question was answered.
    QuestionsExhausted,
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminationReason::TimeExpired => write!(f, "time expired"),
            TerminationReason::QuestionsExhausted => write!(f, "all questions answered"),
        }
    }
}

/// What happened to a submitted answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitOutcome {
    Correct,
    Incorrect,
    /// The session had already finished; nothing changed.
    Ignored,
}

/// One registered answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    /// Position of the question in the bank.
    pub question_index: usize,
    /// The option index that was submitted (may be out of range).
    pub selected_index: usize,
    pub correct: bool,
    /// Countdown value at the moment the answer was registered.
    pub remaining_seconds: u32,
}

/// The question currently on screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionView {
    pub index: usize,
    pub prompt: String,
    pub options: Vec<String>,
}

/// Read-only copy of a session's state, handed to presentation after
/// every mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub remaining_seconds: u32,
    pub duration_secs: u32,
    pub cursor: usize,
    pub score: usize,
    pub total: usize,
    pub phase: Phase,
    pub termination: Option<TerminationReason>,
    /// `None` once the cursor has run past the last question.
    pub current: Option<QuestionView>,
}

impl SessionSnapshot {
    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }
}

/// A single timed run through a question bank.
#[derive(Debug, Clone)]
pub struct AssessmentSession {
    id: Uuid,
    bank: Arc<QuestionBank>,
    config: SessionConfig,
    remaining_seconds: u32,
    cursor: usize,
    score: usize,
    phase: Phase,
    termination: Option<TerminationReason>,
    answers: Vec<AnswerRecord>,
}

impl AssessmentSession {
    /// Start a new session at full time, first question, zero score.
    pub fn new(bank: Arc<QuestionBank>, config: SessionConfig) -> Result<Self, SessionError> {
        if config.duration_secs == 0 {
            return Err(SessionError::ZeroDuration);
        }
        let session = Self::fresh(bank, config);
        tracing::debug!(
            session = %session.id,
            bank = %session.bank.id,
            questions = session.bank.len(),
            duration_secs = config.duration_secs,
            "session created"
        );
        Ok(session)
    }

    fn fresh(bank: Arc<QuestionBank>, config: SessionConfig) -> Self {
        let mut session = Self {
            id: Uuid::new_v4(),
            remaining_seconds: config.duration_secs,
            cursor: 0,
            score: 0,
            phase: Phase::Running,
            termination: None,
            answers: Vec::with_capacity(bank.len()),
            bank,
            config,
        };
        // Only reachable with a bank that bypassed `QuestionBank::new`.
        // Nothing to answer, so the session is finished from the start.
        if session.bank.is_empty() {
            session.finish(TerminationReason::QuestionsExhausted);
        }
        session
    }

    /// Discard this session and build a new one over the same bank and
    /// configuration. Nothing is carried over.
    pub fn restart(&self) -> Self {
        let next = Self::fresh(Arc::clone(&self.bank), self.config);
        tracing::debug!(previous = %self.id, session = %next.id, "session restarted");
        next
    }

    /// One clock tick: remove a second from the countdown and finish the
    /// session when it reaches zero. No-op once finished.
    pub fn tick(&mut self) {
        if self.phase == Phase::Finished {
            return;
        }
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            self.finish(TerminationReason::TimeExpired);
        }
    }

    /// Register an answer for the current question and advance the cursor.
    ///
    /// Ignored once the session has finished. A selection outside the
    /// current question's options is scored as incorrect.
    pub fn submit_answer(&mut self, selected_index: usize) -> SubmitOutcome {
        if self.phase == Phase::Finished {
            return SubmitOutcome::Ignored;
        }
        // Answering the last question finishes the session, so a running
        // session always has a current question.
        debug_assert!(self.cursor < self.bank.len());
        let Some(question) = self.bank.get(self.cursor) else {
            return SubmitOutcome::Ignored;
        };

        let correct = question.is_correct(selected_index);
        if correct {
            self.score += 1;
        }
        self.answers.push(AnswerRecord {
            question_index: self.cursor,
            selected_index,
            correct,
            remaining_seconds: self.remaining_seconds,
        });
        self.cursor += 1;
        tracing::debug!(
            session = %self.id,
            cursor = self.cursor,
            score = self.score,
            correct,
            "answer registered"
        );

        if self.cursor == self.bank.len() {
            self.finish(TerminationReason::QuestionsExhausted);
        }

        if correct {
            SubmitOutcome::Correct
        } else {
            SubmitOutcome::Incorrect
        }
    }

    fn finish(&mut self, reason: TerminationReason) {
        self.phase = Phase::Finished;
        self.termination = Some(reason);
        tracing::debug!(
            session = %self.id,
            %reason,
            score = self.score,
            cursor = self.cursor,
            remaining_seconds = self.remaining_seconds,
            "session finished"
        );
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let current = self.bank.get(self.cursor).map(|q| QuestionView {
            index: self.cursor,
            prompt: q.prompt().to_string(),
            options: q.options().to_vec(),
        });
        SessionSnapshot {
            session_id: self.id,
            remaining_seconds: self.remaining_seconds,
            duration_secs: self.config.duration_secs,
            cursor: self.cursor,
            score: self.score,
            total: self.bank.len(),
            phase: self.phase,
            termination: self.termination,
            current,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn termination(&self) -> Option<TerminationReason> {
        self.termination
    }

    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(duration_secs: u32) -> AssessmentSession {
        AssessmentSession::new(
            Arc::new(QuestionBank::builtin()),
            SessionConfig { duration_secs },
        )
        .unwrap()
    }

    fn assert_invariants(s: &AssessmentSession) {
        assert!(s.score() <= s.cursor());
        assert!(s.cursor() <= s.bank().len());
        assert!(s.remaining_seconds() <= s.config().duration_secs);
        assert_eq!(s.answers().len(), s.cursor());
    }

    #[test]
    fn new_session_starts_fresh() {
        let s = session(300);
        assert_eq!(s.remaining_seconds(), 300);
        assert_eq!(s.cursor(), 0);
        assert_eq!(s.score(), 0);
        assert_eq!(s.phase(), Phase::Running);
        assert_eq!(s.termination(), None);
        assert!(!s.is_finished());
    }

    #[test]
    fn default_duration_is_five_minutes() {
        assert_eq!(SessionConfig::default().duration_secs, 300);
    }

    #[test]
    fn zero_duration_is_rejected() {
        let err = AssessmentSession::new(
            Arc::new(QuestionBank::builtin()),
            SessionConfig { duration_secs: 0 },
        )
        .unwrap_err();
        assert_eq!(err, SessionError::ZeroDuration);
    }

    #[test]
    fn empty_bank_session_is_finished_at_construction() {
        let mut s = AssessmentSession::new(
            Arc::new(QuestionBank::empty_for_tests()),
            SessionConfig::default(),
        )
        .unwrap();
        assert!(s.is_finished());
        assert_eq!(s.termination(), Some(TerminationReason::QuestionsExhausted));
        assert_eq!(s.cursor(), 0);
        assert_eq!(s.remaining_seconds(), 300);
        assert!(s.snapshot().current.is_none());

        assert_eq!(s.submit_answer(0), SubmitOutcome::Ignored);
        s.tick();
        assert_eq!(s.remaining_seconds(), 300);
        assert_eq!(s.score(), 0);
        assert!(s.restart().is_finished());
    }

    #[test]
    fn time_expiry_finishes_without_answers() {
        let mut s = session(2);
        s.tick();
        assert!(!s.is_finished());
        assert_eq!(s.remaining_seconds(), 1);
        s.tick();
        assert!(s.is_finished());
        assert_eq!(s.score(), 0);
        assert_eq!(s.cursor(), 0);
        assert_eq!(s.remaining_seconds(), 0);
        assert_eq!(s.termination(), Some(TerminationReason::TimeExpired));
    }

    #[test]
    fn answering_everything_finishes_before_timeout() {
        let mut s = session(300);
        assert_eq!(s.submit_answer(2), SubmitOutcome::Correct);
        assert_eq!(s.submit_answer(1), SubmitOutcome::Correct);
        assert_eq!(s.submit_answer(3), SubmitOutcome::Incorrect);
        assert_eq!(s.score(), 2);
        assert_eq!(s.cursor(), 3);
        assert!(s.is_finished());
        assert_eq!(s.remaining_seconds(), 300);
        assert_eq!(s.termination(), Some(TerminationReason::QuestionsExhausted));
        assert!(s.snapshot().current.is_none());
    }

    #[test]
    fn tick_then_answer_on_last_second_counts_tick_only() {
        let mut s = session(2);
        s.submit_answer(2);
        s.submit_answer(1);
        s.tick();
        assert_eq!(s.cursor(), 2);
        assert_eq!(s.remaining_seconds(), 1);

        s.tick();
        assert_eq!(s.submit_answer(0), SubmitOutcome::Ignored);

        assert!(s.is_finished());
        assert_eq!(s.termination(), Some(TerminationReason::TimeExpired));
        assert_eq!(s.cursor(), 2);
        assert_eq!(s.score(), 2);
        assert_eq!(s.remaining_seconds(), 0);
    }

    #[test]
    fn answer_then_tick_on_last_second_counts_answer_only() {
        let mut s = session(2);
        s.submit_answer(2);
        s.submit_answer(1);
        s.tick();

        assert_eq!(s.submit_answer(0), SubmitOutcome::Correct);
        s.tick();

        assert!(s.is_finished());
        assert_eq!(s.termination(), Some(TerminationReason::QuestionsExhausted));
        assert_eq!(s.cursor(), 3);
        assert_eq!(s.score(), 3);
        assert_eq!(s.remaining_seconds(), 1);
    }

    #[test]
    fn finished_session_is_frozen() {
        let mut s = session(300);
        for _ in 0..3 {
            s.submit_answer(0);
        }
        let before = s.snapshot();
        s.tick();
        s.tick();
        assert_eq!(s.submit_answer(2), SubmitOutcome::Ignored);
        assert_eq!(s.snapshot(), before);
        assert_eq!(s.answers().len(), 3);
    }

    #[test]
    fn out_of_range_answer_is_scored_wrong() {
        let mut s = session(300);
        assert_eq!(s.submit_answer(42), SubmitOutcome::Incorrect);
        assert_eq!(s.score(), 0);
        assert_eq!(s.cursor(), 1);
        assert_eq!(s.answers()[0].selected_index, 42);
        assert!(!s.answers()[0].correct);
    }

    #[test]
    fn restart_yields_independent_fresh_session() {
        let mut s = session(5);
        s.submit_answer(2);
        s.tick();
        s.tick();
        for _ in 0..3 {
            s.tick();
        }
        assert!(s.is_finished());

        let fresh = s.restart();
        assert_ne!(fresh.id(), s.id());
        assert_eq!(fresh.remaining_seconds(), 5);
        assert_eq!(fresh.cursor(), 0);
        assert_eq!(fresh.score(), 0);
        assert_eq!(fresh.phase(), Phase::Running);
        assert!(fresh.answers().is_empty());

        // The old session is untouched by the restart.
        assert_eq!(s.score(), 1);
        assert!(s.is_finished());
    }

    #[test]
    fn snapshot_exposes_current_question() {
        let mut s = session(300);
        s.submit_answer(2);
        let snap = s.snapshot();
        let current = snap.current.unwrap();
        assert_eq!(current.index, 1);
        assert_eq!(current.prompt, "What is 7 x 8?");
        assert_eq!(current.options.len(), 4);
        assert_eq!(snap.total, 3);
        assert_eq!(snap.duration_secs, 300);
    }

    #[test]
    fn invariants_hold_across_mixed_operations() {
        // Deterministic pseudo-random walk over ticks and answers.
        let mut state = 0x2545_f491_u32;
        for round in 0..200 {
            let mut s = session(1 + round % 7);
            let mut prev_score = 0;
            let mut prev_cursor = 0;
            let mut prev_remaining = s.remaining_seconds();
            for _ in 0..20 {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                if state % 3 == 0 {
                    s.tick();
                } else {
                    s.submit_answer((state % 5) as usize);
                }
                assert_invariants(&s);
                assert!(s.score() >= prev_score);
                assert!(s.cursor() >= prev_cursor);
                assert!(s.remaining_seconds() <= prev_remaining);
                prev_score = s.score();
                prev_cursor = s.cursor();
                prev_remaining = s.remaining_seconds();
            }
        }
    }
}
