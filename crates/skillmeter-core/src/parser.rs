//! TOML question bank parser.
//!
//! Loads question banks from TOML files and directories, and validates them.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::BankError;
use crate::model::{Question, QuestionBank};

/// Intermediate TOML structure for parsing question bank files.
#[derive(Debug, Deserialize)]
struct TomlBankFile {
    bank: TomlBankHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlBankHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    prompt: String,
    #[serde(default)]
    options: Vec<String>,
    correct: usize,
    #[serde(default)]
    tags: Vec<String>,
}

/// Parse a single TOML file into a `QuestionBank`.
pub fn parse_bank(path: &Path) -> Result<QuestionBank> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question bank file: {}", path.display()))?;

    parse_bank_str(&content, path)
}

/// Parse a TOML string into a `QuestionBank` (useful for testing).
pub fn parse_bank_str(content: &str, source_path: &Path) -> Result<QuestionBank> {
    let parsed: TomlBankFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let questions = parsed
        .questions
        .into_iter()
        .enumerate()
        .map(|(i, q)| {
            Question::new(q.prompt, q.options, q.correct)
                .map(|question| question.with_tags(q.tags))
                .map_err(|source| BankError::InvalidQuestion {
                    position: i + 1,
                    source,
                })
        })
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("invalid question bank: {}", source_path.display()))?;

    let bank = QuestionBank::new(parsed.bank.id, parsed.bank.name, questions)
        .with_context(|| format!("invalid question bank: {}", source_path.display()))?
        .with_description(parsed.bank.description);

    Ok(bank)
}

/// Recursively load all `.toml` question bank files from a directory.
pub fn load_bank_directory(dir: &Path) -> Result<Vec<QuestionBank>> {
    let mut banks = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            banks.extend(load_bank_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_bank(&path) {
                Ok(bank) => banks.push(bank),
                Err(e) => {
                    tracing::warn!("skipping {}: {:#}", path.display(), e);
                }
            }
        }
    }

    banks.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(banks)
}

/// A warning from question bank validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// 1-based question number (if applicable).
    pub question: Option<usize>,
    /// Warning message.
    pub message: String,
}

/// Validate a question bank for issues that do not stop a session from
/// running but make for a poor one.
pub fn validate_bank(bank: &QuestionBank) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let mut seen_prompts = std::collections::HashSet::new();
    for (i, question) in bank.questions().iter().enumerate() {
        let number = Some(i + 1);
        let prompt = question.prompt().trim();

        if prompt.is_empty() {
            warnings.push(ValidationWarning {
                question: number,
                message: "prompt is empty".into(),
            });
        } else if !seen_prompts.insert(prompt.to_lowercase()) {
            warnings.push(ValidationWarning {
                question: number,
                message: format!("duplicate prompt: {prompt}"),
            });
        }

        if question.options().len() < 2 {
            warnings.push(ValidationWarning {
                question: number,
                message: "only one option, the answer is given away".into(),
            });
        }

        let mut seen_options = std::collections::HashSet::new();
        for option in question.options() {
            if !seen_options.insert(option.trim()) {
                warnings.push(ValidationWarning {
                    question: number,
                    message: format!("duplicate option: {}", option.trim()),
                });
            }
        }
    }

    warnings
}
