//! The `quizgate validate` command.

use std::path::PathBuf;

use anyhow::Result;

use quizgate_core::parser::{load_quiz_directory, parse_quiz_set, validate_quiz_set};

pub fn execute(quiz_set_path: PathBuf) -> Result<()> {
    let sets = if quiz_set_path.is_dir() {
        load_quiz_directory(&quiz_set_path)?
    } else {
        vec![parse_quiz_set(&quiz_set_path)?]
    };

    let mut total_warnings = 0;

    for set in &sets {
        println!("Quiz set: {} ({} questions)", set.title, set.questions.len());

        let warnings = validate_quiz_set(set);
        for w in &warnings {
            let prefix = w
                .question_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if total_warnings == 0 {
        println!("All quiz sets valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }

    Ok(())
}
