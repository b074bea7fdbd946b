//! The `skillmeter init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("skillmeter.toml").exists() {
        println!("skillmeter.toml already exists, skipping.");
    } else {
        std::fs::write("skillmeter.toml", SAMPLE_CONFIG)?;
        println!("Created skillmeter.toml");
    }

    std::fs::create_dir_all("banks")?;
    let example_path = std::path::Path::new("banks/example.toml");
    if example_path.exists() {
        println!("banks/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_BANK)?;
        println!("Created banks/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit banks/example.toml or add your own banks");
    println!("  2. Run: skillmeter validate --bank banks/example.toml");
    println!("  3. Run: skillmeter practice --bank banks/example.toml");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# skillmeter configuration

# Session length in seconds.
duration_secs = 300

# Clock period in milliseconds. Each tick takes one second off the countdown.
tick_interval_ms = 1000

# Question bank used when --bank is not given.
# question_bank = "banks/example.toml"
"#;

const EXAMPLE_BANK: &str = r#"[bank]
id = "example"
name = "Example Bank"
description = "A short mixed-topic bank to get started"

[[questions]]
prompt = "What is the capital of France?"
options = ["London", "Berlin", "Paris", "Madrid"]
correct = 2
tags = ["geography"]

[[questions]]
prompt = "What is 7 x 8?"
options = ["54", "56", "62", "64"]
correct = 1
tags = ["math"]

[[questions]]
prompt = "Who wrote 'Don Quixote'?"
options = ["Cervantes", "Shakespeare", "Goethe", "Dante"]
correct = 0
tags = ["literature"]

[[questions]]
prompt = "Which planet is closest to the Sun?"
options = ["Venus", "Mercury", "Mars", "Earth"]
correct = 1
tags = ["science"]
"#;
