//! The `quizgate stats` command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizgate_core::report::AnalyticsReport;
use quizgate_core::traits::AttemptStore;

use super::{GlobalOpts, Session};

pub fn execute(
    opts: &GlobalOpts,
    set_id: &str,
    format: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let session = Session::open(opts)?;
    let set = session.quiz_set(set_id)?;
    let attempts = session.store.list_by_set(&set.id)?;
    let report = AnalyticsReport::build(&set, &attempts);

    render(&report, format)?;

    if let Some(path) = output {
        report.save_json(&path)?;
        eprintln!("Report saved to: {}", path.display());
    }

    Ok(())
}

/// Print a report previously written with `--output`.
pub fn show_saved(path: &Path, format: &str) -> Result<()> {
    let report = AnalyticsReport::load_json(path)?;
    render(&report, format)
}

fn render(report: &AnalyticsReport, format: &str) -> Result<()> {
    match format {
        "markdown" | "md" => println!("{}", report.to_markdown()),
        "json" => println!("{}", serde_json::to_string_pretty(report)?),
        "text" => print_text(report),
        other => anyhow::bail!("unknown format: {other} (expected text, json or markdown)"),
    }
    Ok(())
}

fn print_text(report: &AnalyticsReport) {
    println!(
        "{}: {} questions, {} attempts, {} students",
        report.quiz_set.title,
        report.quiz_set.question_count,
        report.attempt_count,
        report.students.len()
    );

    if report.attempt_count == 0 {
        println!("No attempts recorded yet.");
        return;
    }

    let mut questions = Table::new();
    questions.set_header(vec![
        "#",
        "Area",
        "Question",
        "Errors",
        "Attempts",
        "Error rate",
        "Top wrong",
    ]);
    for q in &report.questions {
        let top = q
            .top_wrong_option()
            .map(|o| format!("{} ({})", o.option_id, o.count))
            .unwrap_or_else(|| "-".to_string());
        questions.add_row(vec![
            Cell::new(format!("Q{}", q.original_index)),
            Cell::new(&q.area),
            Cell::new(&q.question_text),
            Cell::new(q.error_count),
            Cell::new(q.total_attempts),
            Cell::new(format!("{:.1}%", q.error_rate_percent())),
            Cell::new(top),
        ]);
    }
    println!("\n{questions}");

    let significant: Vec<_> = report
        .distractors
        .iter()
        .filter(|d| d.is_significant)
        .collect();
    if !significant.is_empty() {
        println!("\nDistractors:");
        for d in significant {
            println!(
                "  Q{} option '{}' picked in {}/{} errors ({:.0}%)",
                d.original_index,
                d.top_wrong_option_id,
                d.top_wrong_count,
                d.error_count,
                d.share * 100.0
            );
        }
    }

    let mut students = Table::new();
    students.set_header(vec![
        "Student",
        "Email",
        "Attempts",
        "Passes",
        "Average",
        "Last active",
    ]);
    for s in &report.students {
        students.add_row(vec![
            Cell::new(&s.display_name),
            Cell::new(&s.user_key),
            Cell::new(s.attempts),
            Cell::new(s.passes),
            Cell::new(format!("{:.1}%", s.average_score)),
            Cell::new(s.last_active.format("%Y-%m-%d %H:%M")),
        ]);
    }
    println!("\n{students}");
}
