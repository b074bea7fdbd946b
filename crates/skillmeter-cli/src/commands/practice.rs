//! The `skillmeter practice` command.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use skillmeter_core::config::load_config_from;
use skillmeter_core::model::QuestionBank;
use skillmeter_core::parser;
use skillmeter_core::report::{format_time, RunOutcome, SessionReport};
use skillmeter_core::session::{AssessmentSession, SessionSnapshot, SubmitOutcome};
use skillmeter_report::{generate_html, render_markdown};
use skillmeter_runner::{AnswerSource, PracticeRunner, SessionObserver};

const FORMATS: &[&str] = &["text", "json", "markdown", "md", "html"];

/// Reads option numbers from stdin.
struct TerminalInput {
    lines: Lines<BufReader<Stdin>>,
}

impl TerminalInput {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    async fn read_line(&mut self) -> Result<Option<String>> {
        self.lines
            .next_line()
            .await
            .context("failed to read from stdin")
    }
}

#[async_trait]
impl AnswerSource for TerminalInput {
    async fn next_answer(&mut self, snapshot: &SessionSnapshot) -> Result<Option<usize>> {
        let option_count = snapshot
            .current
            .as_ref()
            .map(|q| q.options.len())
            .unwrap_or(0);

        loop {
            let Some(line) = self.read_line().await? else {
                return Ok(None);
            };
            let input = line.trim();
            if input.is_empty() {
                continue;
            }
            if input.eq_ignore_ascii_case("q") {
                return Ok(None);
            }
            match input.parse::<usize>() {
                // Numbers past the last option go through and are scored wrong.
                Ok(n) if n >= 1 => return Ok(Some(n - 1)),
                _ => {
                    println!("Enter an option number between 1 and {option_count}, or q to quit.");
                    prompt();
                }
            }
        }
    }
}

/// Prints questions and countdown announcements.
struct ConsoleObserver;

impl ConsoleObserver {
    fn show_question(&self, snapshot: &SessionSnapshot) {
        let Some(question) = &snapshot.current else {
            return;
        };
        println!(
            "\nQuestion {} of {}  [time left {}]",
            question.index + 1,
            snapshot.total,
            format_time(snapshot.remaining_seconds)
        );
        println!("{}", question.prompt);
        for (i, option) in question.options.iter().enumerate() {
            println!("  {}) {}", i + 1, option);
        }
        prompt();
    }
}

impl SessionObserver for ConsoleObserver {
    fn on_start(&self, snapshot: &SessionSnapshot) {
        if !snapshot.is_finished() {
            self.show_question(snapshot);
        }
    }

    fn on_tick(&self, snapshot: &SessionSnapshot) {
        let left = snapshot.remaining_seconds;
        if left > 0 && (left % 30 == 0 || left <= 10) {
            println!("\n  time left: {}", format_time(left));
            prompt();
        }
    }

    fn on_answer(&self, outcome: SubmitOutcome, snapshot: &SessionSnapshot) {
        if outcome != SubmitOutcome::Ignored && !snapshot.is_finished() {
            self.show_question(snapshot);
        }
    }

    fn on_finish(&self, snapshot: &SessionSnapshot) {
        println!();
        match snapshot.termination {
            Some(reason) => println!("Practice finished! ({reason})"),
            None => println!("Practice finished!"),
        }
    }

    fn on_abandon(&self, _snapshot: &SessionSnapshot) {
        println!("\nSession abandoned.");
    }
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

pub async fn execute(
    bank_path: Option<PathBuf>,
    duration: Option<u32>,
    tick_ms: Option<u64>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(
        FORMATS.contains(&format.as_str()),
        "unknown format '{format}', expected one of: text, json, markdown, html"
    );

    let config = load_config_from(config_path.as_deref())?;

    let bank = match bank_path.or_else(|| config.question_bank.clone()) {
        Some(path) => parser::parse_bank(&path)?,
        None => QuestionBank::builtin(),
    };
    for w in parser::validate_bank(&bank) {
        match w.question {
            Some(n) => tracing::warn!("{}: question {}: {}", bank.id, n, w.message),
            None => tracing::warn!("{}: {}", bank.id, w.message),
        }
    }

    let mut session_config = config.session_config();
    if let Some(duration_secs) = duration {
        session_config.duration_secs = duration_secs;
    }
    let tick_period = tick_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.tick_interval());

    println!(
        "Timed practice: {} ({} questions, {})",
        bank.name,
        bank.len(),
        format_time(session_config.duration_secs)
    );
    println!("Answer with the option number, q to quit.");

    let mut session = AssessmentSession::new(Arc::new(bank), session_config)?;
    let runner = PracticeRunner::new(tick_period);
    let mut input = TerminalInput::new();
    let observer = ConsoleObserver;

    loop {
        let started_at = Utc::now();
        let outcome = runner.run(&mut session, &mut input, &observer).await?;
        let report = SessionReport::from_session(&session, outcome, started_at, Utc::now());
        print_report(&report, &format)?;

        if outcome == RunOutcome::Abandoned {
            break;
        }

        println!("\nType r to try again, anything else to quit.");
        if !wants_restart(&mut input).await? {
            break;
        }
        session = session.restart();
    }

    Ok(())
}

/// What a line typed at the restart prompt means.
#[derive(Debug, PartialEq, Eq)]
enum AfterSession {
    Restart,
    /// An option number typed just as the clock ran out.
    LateAnswer,
    Quit,
}

fn after_session(line: &str) -> AfterSession {
    let line = line.trim();
    if line.eq_ignore_ascii_case("r") {
        AfterSession::Restart
    } else if line.parse::<usize>().is_ok() {
        AfterSession::LateAnswer
    } else {
        AfterSession::Quit
    }
}

async fn wants_restart(input: &mut TerminalInput) -> Result<bool> {
    loop {
        prompt();
        let Some(line) = input.read_line().await? else {
            return Ok(false);
        };
        match after_session(&line) {
            AfterSession::Restart => return Ok(true),
            AfterSession::Quit => return Ok(false),
            AfterSession::LateAnswer => {
                println!("That answer came after the session ended. Type r to try again, anything else to quit.");
            }
        }
    }
}

fn print_report(report: &SessionReport, format: &str) -> Result<()> {
    match format {
        "json" => println!("{}", report.to_json()?),
        "markdown" | "md" => println!("{}", render_markdown(report)),
        "html" => println!("{}", generate_html(report)),
        _ => print_summary(report),
    }
    Ok(())
}

fn print_summary(report: &SessionReport) {
    use comfy_table::{Cell, Table};

    println!("{}", report.score_line());
    println!(
        "Time used: {} of {}",
        format_time(report.elapsed_secs()),
        format_time(report.duration_secs)
    );

    if !report.answers.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["#", "Question", "Your answer", "Correct answer", "At"]);
        for row in &report.answers {
            table.add_row(vec![
                Cell::new(row.number),
                Cell::new(&row.prompt),
                Cell::new(row.selected.as_deref().unwrap_or("-")),
                Cell::new(if row.correct {
                    format!("{} (correct)", row.expected)
                } else {
                    row.expected.clone()
                }),
                Cell::new(format_time(row.answered_after_secs)),
            ]);
        }
        println!("\n{table}");
    }

    let tags = report.by_tag();
    if !tags.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Topic", "Correct", "Answered"]);
        for (tag, tally) in &tags {
            table.add_row(vec![
                Cell::new(tag),
                Cell::new(tally.correct),
                Cell::new(tally.answered),
            ]);
        }
        println!("\n{table}");
    }
}
