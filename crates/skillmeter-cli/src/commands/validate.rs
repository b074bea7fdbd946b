//! The `skillmeter validate` command.

use std::path::PathBuf;

use anyhow::Result;

use skillmeter_core::parser;

pub fn execute(bank_path: PathBuf) -> Result<()> {
    let banks = if bank_path.is_dir() {
        parser::load_bank_directory(&bank_path)?
    } else {
        vec![parser::parse_bank(&bank_path)?]
    };

    anyhow::ensure!(
        !banks.is_empty(),
        "no question banks found in {}",
        bank_path.display()
    );

    let mut total_warnings = 0;

    for bank in &banks {
        println!("Question bank: {} ({} questions)", bank.name, bank.len());

        let warnings = parser::validate_bank(bank);
        for w in &warnings {
            let prefix = w
                .question
                .map(|n| format!("  [question {n}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All question banks valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
