//! Markdown report generator.

use skillmeter_core::report::{format_time, SessionReport};

/// Format a session report as markdown.
pub fn render_markdown(report: &SessionReport) -> String {
    let mut md = String::new();

    md.push_str(&format!("## Practice: {}\n\n", report.bank.name));
    md.push_str(&format!(
        "**{}** ({:.1}%), {}\n\n",
        report.score_line(),
        report.percentage() * 100.0,
        report.outcome
    ));
    md.push_str(&format!(
        "Answered {} of {} in {} (limit {})\n\n",
        report.answered(),
        report.total,
        format_time(report.elapsed_secs()),
        format_time(report.duration_secs)
    ));

    if !report.answers.is_empty() {
        md.push_str("### Answers\n\n");
        md.push_str("| # | Question | Your answer | Correct answer | Result | At |\n");
        md.push_str("|---|----------|-------------|----------------|--------|----|\n");
        for row in &report.answers {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} |\n",
                row.number,
                escape_cell(&row.prompt),
                escape_cell(row.selected.as_deref().unwrap_or("-")),
                escape_cell(&row.expected),
                if row.correct { "correct" } else { "wrong" },
                format_time(row.answered_after_secs)
            ));
        }
        md.push('\n');
    }

    let tags = report.by_tag();
    if !tags.is_empty() {
        md.push_str("### By topic\n\n");
        md.push_str("| Topic | Correct | Answered |\n");
        md.push_str("|-------|---------|----------|\n");
        for (tag, tally) in &tags {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                escape_cell(tag),
                tally.correct,
                tally.answered
            ));
        }
        md.push('\n');
    }

    md
}

fn escape_cell(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}
