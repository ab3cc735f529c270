//! The `quizgate import` command.

use std::path::PathBuf;

use anyhow::Result;

use quizgate_core::model::QuizSet;
use quizgate_core::parser::{import_csv, load_quiz_directory, parse_quiz_set, validate_quiz_set};
use quizgate_core::traits::QuizSetStore;

use super::{GlobalOpts, Session};

pub fn execute(
    opts: &GlobalOpts,
    quiz_set_path: Option<PathBuf>,
    csv_path: Option<PathBuf>,
    set_id: Option<String>,
    title: Option<String>,
    created_by: String,
) -> Result<()> {
    let session = Session::open(opts)?;

    if let Some(path) = quiz_set_path {
        let sets = if path.is_dir() {
            load_quiz_directory(&path)?
        } else {
            vec![parse_quiz_set(&path)?]
        };
        anyhow::ensure!(!sets.is_empty(), "no quiz sets found in {}", path.display());

        for set in &sets {
            for w in validate_quiz_set(set) {
                eprintln!("  [{}] WARNING: {}", set.id, w.message);
            }
            session.store.save_set(set)?;
            println!("Imported {} ({} questions) as {}", set.title, set.questions.len(), set.id);
        }
        return Ok(());
    }

    let Some(csv_path) = csv_path else {
        anyhow::bail!("either --quiz-set or --csv is required");
    };

    let questions = import_csv(&csv_path)?;
    anyhow::ensure!(
        !questions.is_empty(),
        "no valid questions found in {}; check the file format (see `quizgate template`)",
        csv_path.display()
    );

    let mut set = match set_id {
        Some(id) => session.quiz_set(&id)?,
        None => QuizSet::new(title.as_deref().unwrap_or("Imported Quiz"), &created_by),
    };
    let count = questions.len();
    set.questions.extend(questions);
    session.store.save_set(&set)?;

    println!("Imported {count} question(s) into {} ({})", set.title, set.id);
    Ok(())
}
