use crate::memory::{Advisory, Severity};
use colored::*;

pub fn print_header(text: &str) {
    println!("\n{}", text.bright_cyan().bold());
    println!("{}", "=".repeat(text.len()).bright_cyan());
}

pub fn print_success(text: &str) {
    println!("{}", text.green());
}

pub fn print_error(text: &str) {
    eprintln!("{}", text.red().bold());
}

pub fn print_info(text: &str) {
    println!("{}", text.blue());
}

pub fn print_prompt(text: &str) {
    print!("{}", text.yellow().bold());
}

/// Renders one advisory in its severity color, with the remediation
/// suggestion on a second line when present.
pub fn print_advisory(advisory: &Advisory) {
    let line = match advisory.severity {
        Severity::Green => advisory.message.green(),
        Severity::Yellow => advisory.message.yellow(),
        Severity::Orange => advisory.message.truecolor(255, 165, 0),
        Severity::Red => advisory.message.red().bold(),
    };
    println!("{}", line);
    if let Some(remediation) = &advisory.remediation {
        println!("{}", format!("  Suggestion: {}", remediation).red());
    }
}

const CHART_WIDTH: usize = 40;

/// Textual bar chart of cumulative token usage, one row per message.
/// Bars scale to the largest value; a ceiling line is appended when one is
/// configured. An empty timeline yields a "nothing to chart" notice.
pub fn render_token_chart(timeline: &[usize], ceiling: Option<usize>) -> String {
    if timeline.is_empty() {
        return "History is empty - nothing to chart.\n".to_string();
    }

    let max = timeline
        .iter()
        .copied()
        .max()
        .unwrap_or(0)
        .max(ceiling.unwrap_or(0))
        .max(1);

    let mut out = String::from("Token usage per message:\n");
    for (i, tokens) in timeline.iter().enumerate() {
        let bar_len = tokens * CHART_WIDTH / max;
        out.push_str(&format!(
            "[{:>3}] |{}{} {} tokens\n",
            i + 1,
            "█".repeat(bar_len),
            " ".repeat(CHART_WIDTH - bar_len),
            tokens
        ));
    }
    if let Some(ceiling) = ceiling {
        let marker = ceiling * CHART_WIDTH / max;
        out.push_str(&format!(
            "      {}^ ceiling: {} tokens\n",
            " ".repeat(marker.saturating_sub(1)),
            ceiling
        ));
    }
    out
}
