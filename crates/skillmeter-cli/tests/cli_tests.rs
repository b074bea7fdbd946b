//! CLI integration tests using assert_cmd.

use std::io::{BufRead, BufReader, Read};
use std::process::Stdio;

use assert_cmd::cargo::CommandCargoExt;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const BANK_TOML: &str = r#"
[bank]
id = "colors"
name = "Colors"

[[questions]]
prompt = "Color of the sky?"
options = ["green", "blue"]
correct = 1
tags = ["nature"]

[[questions]]
prompt = "Color of grass?"
options = ["green", "blue"]
correct = 0
tags = ["nature"]
"#;

fn skillmeter() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("skillmeter").unwrap();
    cmd.env_remove("SKILLMETER_DURATION_SECS")
        .env_remove("SKILLMETER_QUESTION_BANK")
        .env_remove("RUST_LOG");
    cmd
}

/// A practice command run from an empty directory so no stray config is
/// picked up.
fn practice(dir: &TempDir) -> Command {
    let mut cmd = skillmeter();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .arg("practice");
    cmd
}

fn write_bank(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("colors.toml");
    std::fs::write(&path, BANK_TOML).unwrap();
    path
}

#[test]
fn practice_builtin_bank_scores_answers() {
    let dir = TempDir::new().unwrap();
    practice(&dir)
        .write_stdin("3\n2\n4\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Question 1 of 3"))
        .stdout(predicate::str::contains("What is the capital of France?"))
        .stdout(predicate::str::contains("Question 3 of 3"))
        .stdout(predicate::str::contains(
            "Practice finished! (all questions answered)",
        ))
        .stdout(predicate::str::contains("Score: 2 of 3"));
}

#[test]
fn practice_reprompts_on_unparsable_input() {
    let dir = TempDir::new().unwrap();
    practice(&dir)
        .write_stdin("abc\n0\n\n3\n2\n1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Enter an option number between 1 and 4",
        ))
        .stdout(predicate::str::contains("Score: 3 of 3"));
}

#[test]
fn practice_out_of_range_answer_is_wrong() {
    let dir = TempDir::new().unwrap();
    practice(&dir)
        .write_stdin("9\n2\n1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 2 of 3"));
}

#[test]
fn practice_eof_abandons_session() {
    let dir = TempDir::new().unwrap();
    practice(&dir)
        .write_stdin("3\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Session abandoned."))
        .stdout(predicate::str::contains("Score: 1 of 3"))
        .stdout(predicate::str::contains("Practice finished!").not());
}

#[test]
fn practice_quit_abandons_session() {
    let dir = TempDir::new().unwrap();
    practice(&dir)
        .write_stdin("q\n3\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Session abandoned."))
        .stdout(predicate::str::contains("Score: 0 of 3"));
}

#[test]
fn practice_restart_runs_a_fresh_session() {
    let dir = TempDir::new().unwrap();
    practice(&dir)
        .write_stdin("3\n2\n1\nr\n1\n1\n1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 3 of 3"))
        .stdout(predicate::str::contains("Score: 1 of 3"))
        .stdout(predicate::str::contains("Type r to try again").count(2));
}

#[test]
fn practice_late_answer_repeats_restart_prompt() {
    let dir = TempDir::new().unwrap();
    practice(&dir)
        .write_stdin("3\n2\n1\n2\nr\n1\n1\n1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 3 of 3"))
        .stdout(predicate::str::contains(
            "That answer came after the session ended.",
        ))
        .stdout(predicate::str::contains("Score: 1 of 3"));
}

#[test]
fn practice_counts_down_to_time_expiry() {
    let dir = TempDir::new().unwrap();
    #[allow(deprecated)]
    let mut child = std::process::Command::cargo_bin("skillmeter")
        .unwrap()
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("SKILLMETER_DURATION_SECS")
        .env_remove("SKILLMETER_QUESTION_BANK")
        .env_remove("RUST_LOG")
        .args(["practice", "--duration", "12", "--tick-ms", "5"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    // Stdin stays open until the clock has ended the session, so the run
    // can only finish by time expiry.
    let stdin = child.stdin.take().unwrap();
    let mut stdout = BufReader::new(child.stdout.take().unwrap());
    let mut output = String::new();
    loop {
        let mut line = String::new();
        if stdout.read_line(&mut line).unwrap() == 0 {
            break;
        }
        output.push_str(&line);
        if line.contains("Type r to try again") {
            break;
        }
    }
    drop(stdin);
    stdout.read_to_string(&mut output).unwrap();
    assert!(child.wait().unwrap().success());

    assert!(output.contains("Practice finished! (time expired)"), "{output}");
    assert!(output.contains("Score: 0 of 3"), "{output}");
    assert!(output.contains("time left: 0:10"), "{output}");
    assert!(output.contains("time left: 0:01"), "{output}");
    assert!(!output.contains("time left: 0:11"), "{output}");
    assert!(!output.contains("time left: 0:00"), "{output}");
}

#[test]
fn practice_with_bank_file_and_json_output() {
    let dir = TempDir::new().unwrap();
    let bank = write_bank(&dir);
    practice(&dir)
        .arg("--bank")
        .arg(&bank)
        .arg("--format")
        .arg("json")
        .write_stdin("2\n2\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Timed practice: Colors (2 questions, 5:00)",
        ))
        .stdout(predicate::str::contains("\"score\": 1"))
        .stdout(predicate::str::contains("\"reason\": \"questions_exhausted\""));
}

#[test]
fn practice_markdown_output_has_topics() {
    let dir = TempDir::new().unwrap();
    let bank = write_bank(&dir);
    practice(&dir)
        .arg("--bank")
        .arg(&bank)
        .arg("--format")
        .arg("markdown")
        .write_stdin("2\n1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("**Score: 2 of 2**"))
        .stdout(predicate::str::contains("| nature | 2 | 2 |"));
}

#[test]
fn practice_reads_duration_from_config() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("skillmeter.toml"), "duration_secs = 90\n").unwrap();
    practice(&dir)
        .write_stdin("3\n2\n1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("(3 questions, 1:30)"));
}

#[test]
fn practice_flag_overrides_config() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("skillmeter.toml"), "duration_secs = 90\n").unwrap();
    practice(&dir)
        .arg("--duration")
        .arg("45")
        .write_stdin("3\n2\n1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("(3 questions, 0:45)"));
}

#[test]
fn practice_rejects_zero_duration() {
    let dir = TempDir::new().unwrap();
    practice(&dir)
        .arg("--duration")
        .arg("0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("duration must be at least one second"));
}

#[test]
fn practice_rejects_unknown_format() {
    let dir = TempDir::new().unwrap();
    practice(&dir)
        .arg("--format")
        .arg("pdf")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format 'pdf'"));
}

#[test]
fn practice_rejects_empty_bank() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.toml");
    std::fs::write(&path, "[bank]\nid = \"empty\"\nname = \"Empty\"\n").unwrap();
    practice(&dir)
        .arg("--bank")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("question bank is empty"));
}

#[test]
fn validate_bank_file() {
    let dir = TempDir::new().unwrap();
    let bank = write_bank(&dir);
    skillmeter()
        .arg("validate")
        .arg("--bank")
        .arg(&bank)
        .assert()
        .success()
        .stdout(predicate::str::contains("Question bank: Colors (2 questions)"))
        .stdout(predicate::str::contains("All question banks valid."));
}

#[test]
fn validate_reports_warnings() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("warn.toml");
    std::fs::write(
        &path,
        r#"
[bank]
id = "warn"
name = "Warn"

[[questions]]
prompt = "Only one way"
options = ["this"]
correct = 0
"#,
    )
    .unwrap();
    skillmeter()
        .arg("validate")
        .arg("--bank")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("[question 1] WARNING: only one option"))
        .stdout(predicate::str::contains("1 warning(s) found."));
}

#[test]
fn validate_directory() {
    let dir = TempDir::new().unwrap();
    write_bank(&dir);
    std::fs::write(
        dir.path().join("second.toml"),
        BANK_TOML
            .replace("id = \"colors\"", "id = \"shades\"")
            .replace("name = \"Colors\"", "name = \"Shades\""),
    )
    .unwrap();

    skillmeter()
        .arg("validate")
        .arg("--bank")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Colors"))
        .stdout(predicate::str::contains("Shades"));
}

#[test]
fn validate_nonexistent_file() {
    skillmeter()
        .arg("validate")
        .arg("--bank")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    skillmeter()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created skillmeter.toml"))
        .stdout(predicate::str::contains("Created banks/example.toml"));

    assert!(dir.path().join("skillmeter.toml").exists());
    assert!(dir.path().join("banks/example.toml").exists());

    skillmeter()
        .current_dir(dir.path())
        .arg("validate")
        .arg("--bank")
        .arg("banks/example.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains("Example Bank (4 questions)"));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    skillmeter()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    skillmeter()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}
