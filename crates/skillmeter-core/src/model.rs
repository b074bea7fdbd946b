//! Core data model types for skillmeter.
//!
//! Questions and question banks are immutable once built; sessions share a
//! bank through an `Arc` and only ever read from it.

use serde::Serialize;

use crate::error::{BankError, QuestionError};

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    prompt: String,
    options: Vec<String>,
    correct_index: usize,
    tags: Vec<String>,
}

impl Question {
    /// Build a question, checking that `correct_index` points at an option.
    pub fn new(
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_index: usize,
    ) -> Result<Self, QuestionError> {
        if options.is_empty() {
            return Err(QuestionError::NoOptions);
        }
        if correct_index >= options.len() {
            return Err(QuestionError::CorrectIndexOutOfRange {
                index: correct_index,
                len: options.len(),
            });
        }
        Ok(Self {
            prompt: prompt.into(),
            options,
            correct_index,
            tags: Vec::new(),
        })
    }

    /// Attach topic tags used for the per-topic breakdown in reports.
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Options in display order. The position is the selectable index.
    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Whether `selected` is the correct option. Out-of-range selections
    /// are simply wrong.
    pub fn is_correct(&self, selected: usize) -> bool {
        selected == self.correct_index
    }
}

/// An ordered, non-empty collection of questions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionBank {
    /// Unique identifier for this bank.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Description of this bank.
    pub description: String,
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Build a bank. An empty question list is rejected.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        questions: Vec<Question>,
    ) -> Result<Self, BankError> {
        if questions.is_empty() {
            return Err(BankError::Empty);
        }
        Ok(Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            questions,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// The three-question bank used when no bank file is configured.
    pub fn builtin() -> Self {
        let q = |prompt: &str, options: [&str; 4], correct: usize, tag: &str| Question {
            prompt: prompt.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            correct_index: correct,
            tags: vec![tag.to_string()],
        };

        Self {
            id: "builtin".into(),
            name: "Quick Practice".into(),
            description: "A short mixed-topic warm-up".into(),
            questions: vec![
                q(
                    "What is the capital of France?",
                    ["London", "Berlin", "Paris", "Madrid"],
                    2,
                    "geography",
                ),
                q("What is 7 x 8?", ["54", "56", "62", "64"], 1, "math"),
                q(
                    "Who wrote 'Don Quixote'?",
                    ["Cervantes", "Shakespeare", "Goethe", "Dante"],
                    0,
                    "literature",
                ),
            ],
        }
    }

    /// An empty bank, which `new` refuses to build.
    #[cfg(test)]
    pub(crate) fn empty_for_tests() -> Self {
        Self {
            id: "empty".into(),
            name: "Empty".into(),
            description: String::new(),
            questions: Vec::new(),
        }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always `false` for a bank built through [`QuestionBank::new`].
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
