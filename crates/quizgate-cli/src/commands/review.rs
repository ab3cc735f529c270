//! The `quizgate status`, `review` and `history` commands.

use anyhow::Result;

use quizgate_core::gate::{
    history_for, review_items, trace_attempt, AccessGate, GateState, ReviewItem,
};
use quizgate_core::traits::AttemptStore;

use super::{GlobalOpts, Session};

pub fn status(opts: &GlobalOpts, set_id: &str, email: &str) -> Result<()> {
    let session = Session::open(opts)?;
    let set = session.quiz_set(set_id)?;
    let history = session.store.list_by_set(&set.id)?;
    let gate = AccessGate::from_history(&set, &history, email);

    println!("{} for {email}", set.title);
    println!("  State:     {}", gate.state());
    println!("  Attempts:  {}", gate.attempts_used());
    println!("  Remaining: {}", gate.remaining_attempts());
    Ok(())
}

pub fn execute(opts: &GlobalOpts, set_id: &str, email: &str, passcode: Option<&str>) -> Result<()> {
    let session = Session::open(opts)?;
    let set = session.quiz_set(set_id)?;
    let history = session.store.list_by_set(&set.id)?;
    let mut gate = AccessGate::from_history(&set, &history, email);

    if let Some(code) = passcode {
        if gate.state().can_view_solutions() {
            tracing::debug!("passcode ignored, solutions already visible");
            println!("Solutions are already visible; no passcode needed.");
        } else {
            gate.unlock(code)?;
            println!("Review unlocked.");
        }
    }

    let state = gate.state();
    if state == GateState::InProgress {
        println!(
            "Review is available after passing or using all attempts ({} left).",
            gate.remaining_attempts()
        );
        return Ok(());
    }

    let mine = history_for(&history, &set.id, email);
    let Some(latest) = mine.first() else {
        println!("No attempts recorded for {email}.");
        return Ok(());
    };

    println!("{} ({state}), attempt {}", set.title, latest.attempt_number);
    if state == GateState::LockedReview {
        println!("Answers are locked. Re-run with --passcode to see solutions.");
    }

    let items = review_items(&set, latest, state);
    for (area, questions) in set.questions_by_area() {
        println!("\n== {area} ==");
        for q in questions {
            if let Some(index) = items.iter().position(|i| i.question_id == q.id) {
                print_item(index + 1, &items[index]);
            }
        }
    }
    Ok(())
}

fn print_item(number: usize, item: &ReviewItem) {
    println!("Q{number}. {}", item.question_text);
    let selected = item.selected_text.as_deref().unwrap_or("(no answer)");
    match item.is_correct {
        Some(true) => println!("  Your answer: {selected} (correct)"),
        Some(false) => println!("  Your answer: {selected} (incorrect)"),
        None => println!("  Your answer: {selected}"),
    }
    if let Some(correct) = &item.correct_text {
        println!("  Correct answer: {correct}");
    }
    if let Some(explanation) = &item.explanation {
        println!("  Explanation: {explanation}");
    }
}

pub fn history(opts: &GlobalOpts, set_id: &str, email: &str, detail: bool) -> Result<()> {
    let session = Session::open(opts)?;
    let set = session.quiz_set(set_id)?;
    let all = session.store.list_by_set(&set.id)?;
    let mine = history_for(&all, &set.id, email);

    if mine.is_empty() {
        println!("No attempts recorded for {email} on {}.", set.title);
        return Ok(());
    }

    for attempt in mine {
        println!(
            "#{} {}  {:.1}%  {}",
            attempt.attempt_number,
            attempt.timestamp.format("%Y-%m-%d %H:%M"),
            attempt.score_percent(),
            if attempt.is_complete_success { "PASS" } else { "FAIL" }
        );
        if detail {
            for entry in trace_attempt(&set, attempt) {
                println!("    {} -> {}", entry.question_text, entry.selected_text);
            }
        }
    }
    Ok(())
}
