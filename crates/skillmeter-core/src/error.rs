//! Domain error types.
//!
//! These cover construction-time invariant violations only. Runtime
//! anomalies (late ticks, answers after the session finished, out-of-range
//! selections) are absorbed by the state machine and never surface here.

use thiserror::Error;

/// A question that cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionError {
    /// The question has no options to choose from.
    #[error("question has no options")]
    NoOptions,

    /// The correct index does not point at an option.
    #[error("correct index {index} is out of range for {len} option(s)")]
    CorrectIndexOutOfRange { index: usize, len: usize },
}

/// A question bank that cannot be built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BankError {
    /// Sessions need at least one question.
    #[error("question bank is empty")]
    Empty,

    /// One of the questions is malformed (1-based position).
    #[error("question {position} is invalid")]
    InvalidQuestion {
        position: usize,
        #[source]
        source: QuestionError,
    },
}

/// A session that cannot be started.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// A session must last at least one tick.
    #[error("session duration must be at least one second")]
    ZeroDuration,
}
