//! The `quizgate sets` and `quizgate delete-set` commands.

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizgate_core::model::{Question, QuizSet};
use quizgate_core::traits::{AttemptStore, QuizSetStore};

use super::{GlobalOpts, Session};

pub fn execute(opts: &GlobalOpts) -> Result<()> {
    let session = Session::open(opts)?;
    let sets = session.store.list_sets()?;

    if sets.is_empty() {
        println!("No quiz sets. Import one with `quizgate import --quiz-set <file>`.");
        return Ok(());
    }

    let attempts = session.store.list_all()?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Questions", "Areas", "Attempts", "Passcode"]);
    for set in &sets {
        let count = attempts.iter().filter(|a| a.quiz_set_id == set.id).count();
        table.add_row(vec![
            Cell::new(&set.id),
            Cell::new(&set.title),
            Cell::new(set.questions.len()),
            Cell::new(set.areas().join(", ")),
            Cell::new(count),
            Cell::new(if set.passcode.is_some() { "custom" } else { "default" }),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn create(opts: &GlobalOpts, title: &str, questions: usize, created_by: &str) -> Result<()> {
    anyhow::ensure!(!title.trim().is_empty(), "quiz set title must not be empty");

    let session = Session::open(opts)?;
    let mut set = QuizSet::new(title.trim(), created_by);
    set.questions = (0..questions)
        .map(|_| Question::new_placeholder())
        .collect();
    session.store.save_set(&set)?;

    println!("Created {} ({}) with {questions} question(s)", set.title, set.id);
    Ok(())
}

pub fn delete(opts: &GlobalOpts, id: &str) -> Result<()> {
    let session = Session::open(opts)?;
    let set = session.quiz_set(id)?;
    session.store.delete_set(id)?;
    println!("Deleted {} ({id})", set.title);
    Ok(())
}
