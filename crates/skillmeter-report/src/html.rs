//! HTML report generator.
//!
//! Produces a self-contained HTML page with all CSS/JS inlined.

use std::collections::BTreeMap;

use skillmeter_core::report::{format_time, RunOutcome, SessionReport, TagTally};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML page from a session report.
pub fn generate_html(report: &SessionReport) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>skillmeter practice: {}</title>\n",
        html_escape(&report.bank.name)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str(match report.outcome {
        RunOutcome::Finished(_) => "<h1>Practice finished!</h1>\n",
        RunOutcome::Abandoned => "<h1>Practice abandoned</h1>\n",
    });
    html.push_str(&format!(
        "<p class=\"meta\">Bank: <strong>{}</strong> | {} questions | {}</p>\n",
        html_escape(&report.bank.name),
        report.bank.question_count,
        report.finished_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Score card
    let outcome_class = match report.outcome {
        RunOutcome::Finished(_) => "pass",
        RunOutcome::Abandoned => "fail",
    };
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str(&format!(
        "<p class=\"score\">{}</p>\n",
        html_escape(&report.score_line())
    ));
    html.push_str("<table class=\"summary\">\n<tbody>\n");
    html.push_str(&format!(
        "<tr><th>Result</th><td class=\"{outcome_class}\">{}</td></tr>\n",
        html_escape(&report.outcome.to_string())
    ));
    html.push_str(&format!(
        "<tr><th>Accuracy</th><td>{:.1}%</td></tr>\n",
        report.percentage() * 100.0
    ));
    html.push_str(&format!(
        "<tr><th>Answered</th><td>{} of {}</td></tr>\n",
        report.answered(),
        report.total
    ));
    html.push_str(&format!(
        "<tr><th>Time used</th><td>{} of {}</td></tr>\n",
        format_time(report.elapsed_secs()),
        format_time(report.duration_secs)
    ));
    html.push_str("</tbody></table>\n");

    let tags = report.by_tag();
    if !tags.is_empty() {
        html.push_str("<h2>By topic</h2>\n");
        html.push_str(&generate_bar_chart(&tags));
    }
    html.push_str("</section>\n");

    // Per-question answers
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Answers</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"answers\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable(0)\">#</th><th onclick=\"sortTable(1)\">Question</th><th onclick=\"sortTable(2)\">Your answer</th><th onclick=\"sortTable(3)\">Correct answer</th><th onclick=\"sortTable(4)\">At</th></tr></thead>\n");
    html.push_str("<tbody>\n");

    for row in &report.answers {
        let class = if row.correct { "pass" } else { "fail" };
        let selected = row.selected.as_deref().unwrap_or("(no such option)");
        html.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            class,
            row.number,
            html_escape(&row.prompt),
            html_escape(selected),
            html_escape(&row.expected),
            format_time(row.answered_after_secs)
        ));
    }

    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(&report.to_json().unwrap_or_default()));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

fn generate_bar_chart(tags: &BTreeMap<String, TagTally>) -> String {
    let bar_height = 30;
    let max_width = 400;
    let padding = 10;
    let label_width = 200;

    let total_height = tags.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 80,
        total_height
    );

    for (i, (tag, tally)) in tags.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let ratio = if tally.answered == 0 {
            0.0
        } else {
            tally.correct as f64 / tally.answered as f64
        };
        let width = (ratio * max_width as f64) as usize;

        let color = if ratio >= 0.8 {
            "#22c55e"
        } else if ratio >= 0.5 {
            "#eab308"
        } else {
            "#ef4444"
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(tag)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{}/{}</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            tally.correct,
            tally.answered
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0 auto; padding: 2rem; max-width: 48rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
.score { font-size: 1.5rem; font-weight: bold; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); }
.results-table th { cursor: pointer; }
.pass { background: var(--pass); }
.fail { background: var(--fail); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('answers');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    return asc ? va.localeCompare(vb, undefined, { numeric: true }) : vb.localeCompare(va, undefined, { numeric: true });
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;
